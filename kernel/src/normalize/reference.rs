use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use error_stack::Report;
use regex::Regex;

use super::escape::{escape, unescape, valid_encoded, Component};
use crate::KernelError;

static SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("scheme pattern must compile")
});

fn malformed(message: impl Into<String>) -> Report<KernelError> {
    Report::new(KernelError::MalformedUrl).attach_printable(message.into())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Userinfo {
    username: Vec<u8>,
    password: Option<Vec<u8>>,
}

impl Userinfo {
    fn parse(raw: &str) -> Result<Self, Report<KernelError>> {
        let valid = raw.bytes().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    b'-' | b'.'
                        | b'_'
                        | b':'
                        | b'~'
                        | b'!'
                        | b'$'
                        | b'&'
                        | b'\''
                        | b'('
                        | b')'
                        | b'*'
                        | b'+'
                        | b','
                        | b';'
                        | b'='
                        | b'%'
                        | b'@'
                )
        });
        if !valid {
            return Err(malformed("Invalid userinfo"));
        }
        let (username, password) = match raw.split_once(':') {
            Some((username, password)) => (
                username,
                Some(unescape(password, Component::UserPassword)?),
            ),
            None => (raw, None),
        };
        Ok(Self {
            username: unescape(username, Component::UserPassword)?,
            password,
        })
    }
}

impl Display for Userinfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", escape(&self.username, Component::UserPassword))?;
        if let Some(password) = &self.password {
            write!(f, ":{}", escape(password, Component::UserPassword))?;
        }
        Ok(())
    }
}

/// A parsed URL reference. Path, host and fragment are held decoded; the raw
/// escaped forms are kept only when they differ from the default encoding, so
/// an untouched reference serializes back to its input.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct UrlReference {
    scheme: String,
    opaque: String,
    user: Option<Userinfo>,
    host: Vec<u8>,
    omit_host: bool,
    path: Vec<u8>,
    raw_path: String,
    force_query: bool,
    raw_query: String,
    fragment: Vec<u8>,
    raw_fragment: String,
}

impl UrlReference {
    /// Parses `raw` as a request target: an absolute url or a rooted path.
    /// `#` has no special meaning here.
    pub(crate) fn parse_request(raw: &str) -> Result<Self, Report<KernelError>> {
        Self::parse_reference(raw, true)
    }

    pub(crate) fn canonicalize(mut self) -> Self {
        self.raw_query.clear();
        self.fragment.clear();
        self.raw_fragment.clear();
        while self.path.last() == Some(&b'/') {
            self.path.pop();
        }
        self
    }

    pub(crate) fn redirect(mut self, host: &str) -> Self {
        self.scheme = self.scheme.to_ascii_lowercase();
        self.host = host.as_bytes().to_vec();
        self.path = String::from_utf8_lossy(&self.path)
            .to_lowercase()
            .into_bytes();
        self
    }

    fn parse_reference(raw: &str, via_request: bool) -> Result<Self, Report<KernelError>> {
        if raw.bytes().any(|c| c < 0x20 || c == 0x7f) {
            return Err(malformed("Invalid control character in url"));
        }
        if via_request && raw.is_empty() {
            return Err(malformed("Empty url"));
        }
        let mut url = Self::default();
        if raw == "*" {
            url.path = b"*".to_vec();
            return Ok(url);
        }

        if raw.starts_with(':') {
            return Err(malformed("Missing protocol scheme"));
        }
        let mut rest = match SCHEME.captures(raw) {
            Some(captures) => {
                let scheme = &captures[1];
                url.scheme = scheme.to_string();
                &raw[scheme.len() + 1..]
            }
            None => raw,
        };

        if rest.ends_with('?') && rest.matches('?').count() == 1 {
            url.force_query = true;
            rest = &rest[..rest.len() - 1];
        } else if let Some((before, query)) = rest.split_once('?') {
            url.raw_query = query.to_string();
            rest = before;
        }

        if !rest.starts_with('/') {
            if !url.scheme.is_empty() {
                url.opaque = rest.to_string();
                return Ok(url);
            }
            if via_request {
                return Err(malformed("Invalid url for request"));
            }
            let segment = rest.split('/').next().unwrap_or_default();
            if segment.contains(':') {
                return Err(malformed("First path segment in url cannot contain colon"));
            }
        }

        if (!url.scheme.is_empty() || !via_request && !rest.starts_with("///"))
            && rest.starts_with("//")
        {
            let (authority, path) = match rest[2..].find('/') {
                Some(index) => rest[2..].split_at(index),
                None => (&rest[2..], ""),
            };
            url.parse_authority(authority)?;
            rest = path;
        } else if !url.scheme.is_empty() && rest.starts_with('/') {
            url.omit_host = true;
        }

        url.set_path(rest)?;
        Ok(url)
    }

    fn parse_authority(&mut self, authority: &str) -> Result<(), Report<KernelError>> {
        let (userinfo, host) = match authority.rsplit_once('@') {
            Some((userinfo, host)) => (Some(userinfo), host),
            None => (None, authority),
        };
        self.host = parse_host(host)?;
        self.user = userinfo.map(Userinfo::parse).transpose()?;
        Ok(())
    }

    fn set_path(&mut self, raw: &str) -> Result<(), Report<KernelError>> {
        self.path = unescape(raw, Component::Path)?;
        self.raw_path = if escape(&self.path, Component::Path) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        Ok(())
    }

    fn set_fragment(&mut self, raw: &str) -> Result<(), Report<KernelError>> {
        self.fragment = unescape(raw, Component::Fragment)?;
        self.raw_fragment = if escape(&self.fragment, Component::Fragment) == raw {
            String::new()
        } else {
            raw.to_string()
        };
        Ok(())
    }

    fn escaped_path(&self) -> String {
        if preserves(&self.raw_path, &self.path, Component::Path) {
            return self.raw_path.clone();
        }
        if self.path == b"*" {
            return "*".to_string();
        }
        escape(&self.path, Component::Path)
    }

    fn escaped_fragment(&self) -> String {
        if preserves(&self.raw_fragment, &self.fragment, Component::Fragment) {
            return self.raw_fragment.clone();
        }
        escape(&self.fragment, Component::Fragment)
    }
}

/// Whether `raw` is still a faithful escaped form of `decoded`.
fn preserves(raw: &str, decoded: &[u8], component: Component) -> bool {
    !raw.is_empty()
        && valid_encoded(raw, component)
        && unescape(raw, component).is_ok_and(|unescaped| unescaped == decoded)
}

fn parse_host(host: &str) -> Result<Vec<u8>, Report<KernelError>> {
    if host.starts_with('[') {
        let close = host
            .rfind(']')
            .ok_or_else(|| malformed("Missing ']' in host"))?;
        let port = &host[close + 1..];
        if !valid_optional_port(port) {
            return Err(malformed(format!("Invalid port {port:?} after host")));
        }
    } else if let Some(colon) = host.rfind(':') {
        let port = &host[colon..];
        if !valid_optional_port(port) {
            return Err(malformed(format!("Invalid port {port:?} after host")));
        }
    }
    unescape(host, Component::Host)
}

fn valid_optional_port(port: &str) -> bool {
    match port.strip_prefix(':') {
        Some(digits) => digits.bytes().all(|c| c.is_ascii_digit()),
        None => port.is_empty(),
    }
}

impl FromStr for UrlReference {
    type Err = Report<KernelError>;
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (reference, fragment) = raw.split_once('#').unwrap_or((raw, ""));
        let mut url = Self::parse_reference(reference, false)?;
        url.set_fragment(fragment)?;
        Ok(url)
    }
}

impl Display for UrlReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut written = false;
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
            written = true;
        }
        if !self.opaque.is_empty() {
            write!(f, "{}", self.opaque)?;
        } else {
            let has_authority =
                !self.scheme.is_empty() || !self.host.is_empty() || self.user.is_some();
            let omitted = self.omit_host && self.host.is_empty() && self.user.is_none();
            if has_authority && !omitted {
                if !self.host.is_empty() || !self.path.is_empty() || self.user.is_some() {
                    write!(f, "//")?;
                    written = true;
                }
                if let Some(user) = &self.user {
                    write!(f, "{user}@")?;
                }
                if !self.host.is_empty() {
                    write!(f, "{}", escape(&self.host, Component::Host))?;
                }
            }
            let path = self.escaped_path();
            if !path.is_empty() && !path.starts_with('/') && !self.host.is_empty() {
                write!(f, "/")?;
            }
            // Keeps a leading `a:b` segment from reading as a scheme.
            if !written && path.split('/').next().is_some_and(|s| s.contains(':')) {
                write!(f, "./")?;
            }
            write!(f, "{path}")?;
        }
        if self.force_query || !self.raw_query.is_empty() {
            write!(f, "?{}", self.raw_query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.escaped_fragment())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::UrlReference;
    use crate::KernelError;

    fn parse(raw: &str) -> UrlReference {
        raw.parse().unwrap()
    }

    #[test]
    fn split_components() {
        let url = parse("https://user@BYFOOD.com:8443/Food%20Tours/?q=1#Top");
        assert_eq!(url.scheme, "https");
        assert_eq!(url.user.as_ref().unwrap().username, b"user");
        assert_eq!(url.host, b"BYFOOD.com:8443");
        assert_eq!(url.path, b"/Food Tours/");
        assert_eq!(url.raw_query, "q=1");
        assert_eq!(url.fragment, b"Top");
    }

    #[test]
    fn untouched_reference_serializes_verbatim() {
        for raw in [
            "",
            "https://BYFOOD.com/food-EXPeriences?query=abc/",
            "http://example.com/a%20b?x=%2F#frag",
            "http://example.com/%41BC/a(b)",
            "mailto:someone@example.com",
            "/relative/path?",
            "//cdn.example.com/lib.js",
            "file:///etc/hosts",
            "http://[::1]:8080/",
        ] {
            assert_eq!(parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn only_control_bytes_are_rejected_outright() {
        assert_eq!(
            parse("http://example.com/a b").to_string(),
            "http://example.com/a%20b"
        );
        assert_eq!(
            parse("http://bücher.de/Katalog").to_string(),
            "http://b%C3%BCcher.de/Katalog"
        );
    }

    #[test]
    fn reject_malformed() {
        for raw in [
            "%%%invalid-url",
            "http://example.com/%zz",
            "http://example.com/%4",
            "1http://example.com",
            ":foo",
            "http://exa mple.com/",
            "http://%41.com/",
            "http://[::1/",
            "http://example.com:8o/",
            "http://us er@example.com/",
            "http://example.com/\n",
            "http://example.com/\x7f",
        ] {
            let report = raw.parse::<UrlReference>().unwrap_err();
            assert_eq!(report.current_context(), &KernelError::MalformedUrl, "{raw:?}");
        }
    }

    #[test]
    fn canonicalize_strips_trailing_separators_only() {
        let url = parse("https://BYFOOD.com/Food///?q=1#x").canonicalize();
        assert_eq!(url.to_string(), "https://BYFOOD.com/Food");
        assert_eq!(parse("/").canonicalize().to_string(), "");
    }

    #[test]
    fn canonicalize_works_on_decoded_path() {
        assert_eq!(
            parse("https://x.com/x%2F").canonicalize().to_string(),
            "https://x.com/x"
        );
        assert_eq!(
            parse("http://example.com/Path%2FWith%20Escapes/")
                .canonicalize()
                .to_string(),
            "http://example.com/Path/With%20Escapes"
        );
    }

    #[test]
    fn redirect_keeps_userinfo_and_drops_port() {
        let url = parse("HTTP://user:pw@Example.com:8080/A/B?Q=1#F").redirect("www.byfood.com");
        assert_eq!(url.to_string(), "http://user:pw@www.byfood.com/a/b?Q=1#F");
    }

    #[test]
    fn redirect_lower_cases_decoded_path() {
        let url = parse("https://x.com/%41BC").redirect("www.byfood.com");
        assert_eq!(url.to_string(), "https://www.byfood.com/abc");
    }

    #[test]
    fn redirect_roots_relative_path_under_new_host() {
        let url = parse("Food/Menu").redirect("www.byfood.com");
        assert_eq!(url.to_string(), "//www.byfood.com/food/menu");
        let url = parse("").redirect("www.byfood.com");
        assert_eq!(url.to_string(), "//www.byfood.com");
    }

    #[test]
    fn redirect_leaves_opaque_reference_alone() {
        let url = parse("URN:Example").redirect("www.byfood.com");
        assert_eq!(url.to_string(), "urn:Example");
    }

    #[test]
    fn request_target_must_be_absolute_or_rooted() {
        for raw in ["https://byfood.com", "/books?page=2", "mailto:a@b.c", "*"] {
            assert!(UrlReference::parse_request(raw).is_ok(), "{raw:?}");
        }
        for raw in ["", "bad-url", "food/menu", "%%%invalid-url"] {
            assert!(UrlReference::parse_request(raw).is_err(), "{raw:?}");
        }
    }
}
