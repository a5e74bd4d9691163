use error_stack::Report;

use crate::KernelError;

/// URL component a byte sequence is escaped for. Each component reserves a different set.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Component {
    Host,
    UserPassword,
    Path,
    Fragment,
}

pub(crate) fn should_escape(c: u8, component: Component) -> bool {
    if c.is_ascii_alphanumeric() {
        return false;
    }
    if component == Component::Host
        && matches!(
            c,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'['
                | b']'
                | b'<'
                | b'>'
                | b'"'
        )
    {
        return false;
    }
    match c {
        b'-' | b'_' | b'.' | b'~' => return false,
        b'$' | b'&' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'?' | b'@' => {
            return match component {
                Component::UserPassword => matches!(c, b'@' | b'/' | b'?' | b':'),
                Component::Path => c == b'?',
                Component::Fragment => false,
                Component::Host => true,
            }
        }
        _ => {}
    }
    !(component == Component::Fragment && matches!(c, b'!' | b'(' | b')' | b'*'))
}

pub(crate) fn escape(bytes: &[u8], component: Component) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut escaped = String::with_capacity(bytes.len());
    for &c in bytes {
        if should_escape(c, component) {
            escaped.push('%');
            escaped.push(HEX[usize::from(c >> 4)] as char);
            escaped.push(HEX[usize::from(c & 0x0f)] as char);
        } else {
            escaped.push(c as char);
        }
    }
    escaped
}

pub(crate) fn unescape(raw: &str, component: Component) -> Result<Vec<u8>, Report<KernelError>> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let c = bytes[index];
        if c == b'%' {
            let (Some(high), Some(low)) = (
                bytes.get(index + 1).and_then(|b| hex_value(*b)),
                bytes.get(index + 2).and_then(|b| hex_value(*b)),
            ) else {
                let end = (index + 3).min(raw.len());
                return Err(Report::new(KernelError::MalformedUrl).attach_printable(format!(
                    "Invalid url escape {:?}",
                    String::from_utf8_lossy(&bytes[index..end])
                )));
            };
            // Hosts may only escape non-ASCII bytes, except for `%25`.
            if component == Component::Host && high < 8 && &raw[index..index + 3] != "%25" {
                return Err(Report::new(KernelError::MalformedUrl).attach_printable(format!(
                    "Invalid url escape {:?} in host",
                    &raw[index..index + 3]
                )));
            }
            decoded.push(high << 4 | low);
            index += 3;
            continue;
        }
        if component == Component::Host && c.is_ascii() && should_escape(c, component) {
            return Err(Report::new(KernelError::MalformedUrl)
                .attach_printable(format!("Invalid character {:?} in host name", c as char)));
        }
        decoded.push(c);
        index += 1;
    }
    Ok(decoded)
}

/// Whether `raw` is an acceptable escaped form of its component, so it can be emitted verbatim.
pub(crate) fn valid_encoded(raw: &str, component: Component) -> bool {
    raw.bytes().all(|c| {
        matches!(
            c,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'@'
                | b'['
                | b']'
                | b'%'
        ) || !should_escape(c, component)
    })
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
