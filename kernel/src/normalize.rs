mod escape;
mod operation;
mod reference;

use std::fmt::Display;

use error_stack::ResultExt;

pub use self::operation::*;
use self::reference::UrlReference;
use crate::KernelError;

pub const DEFAULT_CANONICAL_HOST: &str = "www.byfood.com";

/// Which parse failed. Attached to every [`KernelError::MalformedUrl`] report
/// produced by [`StandardUrlNormalizer`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ParseStage {
    Input,
    Canonicalized,
}

impl Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStage::Input => write!(f, "while parsing input url"),
            ParseStage::Canonicalized => write!(f, "while re-parsing canonicalized url"),
        }
    }
}

pub trait UrlNormalizer: 'static + Sync + Send {
    fn normalize(
        &self,
        raw: &str,
        operation: Operation,
    ) -> error_stack::Result<String, KernelError>;
}

pub trait DependOnUrlNormalizer: 'static + Sync + Send {
    type UrlNormalizer: UrlNormalizer;
    fn url_normalizer(&self) -> &Self::UrlNormalizer;
}

#[derive(Debug, Clone)]
pub struct StandardUrlNormalizer {
    canonical_host: String,
}

impl StandardUrlNormalizer {
    pub fn new(canonical_host: impl Into<String>) -> Self {
        Self {
            canonical_host: canonical_host.into(),
        }
    }
}

impl Default for StandardUrlNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_CANONICAL_HOST)
    }
}

impl UrlNormalizer for StandardUrlNormalizer {
    fn normalize(
        &self,
        raw: &str,
        operation: Operation,
    ) -> error_stack::Result<String, KernelError> {
        let parsed = parse(raw, ParseStage::Input)?;
        let normalized = match operation {
            Operation::Canonical => parsed.canonicalize().to_string(),
            Operation::Redirection => parsed.redirect(&self.canonical_host).to_string(),
            Operation::All => {
                let canonicalized = parsed.canonicalize().to_string();
                parse(&canonicalized, ParseStage::Canonicalized)?
                    .redirect(&self.canonical_host)
                    .to_string()
            }
        };
        Ok(normalized)
    }
}

/// Whether `raw` is usable as a request target: an absolute url or a rooted path.
pub fn is_request_uri(raw: &str) -> bool {
    UrlReference::parse_request(raw).is_ok()
}

fn parse(raw: &str, stage: ParseStage) -> error_stack::Result<UrlReference, KernelError> {
    raw.parse::<UrlReference>()
        .attach_printable(stage)
        .attach_printable_lazy(|| format!("Url: {raw:?}"))
}

#[cfg(test)]
mod test {
    use super::{is_request_uri, Operation, ParseStage, StandardUrlNormalizer, UrlNormalizer};
    use crate::KernelError;

    const EXAMPLE: &str = "https://BYFOOD.com/food-EXPeriences?query=abc/";

    fn normalize(raw: &str, operation: Operation) -> String {
        StandardUrlNormalizer::default()
            .normalize(raw, operation)
            .unwrap()
    }

    #[test]
    fn canonical_keeps_casing() {
        assert_eq!(
            normalize(EXAMPLE, Operation::Canonical),
            "https://BYFOOD.com/food-EXPeriences"
        );
        assert_eq!(
            normalize("HTTPS://X.com/A/", Operation::Canonical),
            "HTTPS://X.com/A"
        );
    }

    #[test]
    fn canonical_trims_the_decoded_path() {
        assert_eq!(
            normalize("https://x.com/x%2F", Operation::Canonical),
            "https://x.com/x"
        );
        assert_eq!(normalize("/", Operation::Canonical), "");
        assert_eq!(normalize("?page=2", Operation::Canonical), "");
    }

    #[test]
    fn redirection_keeps_query_and_fragment() {
        assert_eq!(
            normalize("HTTPS://BYFOOD.com/Food/?Query=ABC#Top", Operation::Redirection),
            "https://www.byfood.com/food/?Query=ABC#Top"
        );
    }

    #[test]
    fn redirection_lower_cases_the_decoded_path() {
        assert_eq!(
            normalize("https://x.com/%41BC", Operation::Redirection),
            "https://www.byfood.com/abc"
        );
    }

    #[test]
    fn all_canonicalizes_then_redirects() {
        assert_eq!(
            normalize(EXAMPLE, Operation::All),
            "https://www.byfood.com/food-experiences"
        );
        assert_eq!(
            normalize("https://byfood.com", Operation::All),
            "https://www.byfood.com"
        );
        assert_eq!(normalize("/", Operation::All), "//www.byfood.com");
        assert_eq!(normalize("?page=2", Operation::All), "//www.byfood.com");
    }

    #[test]
    fn redirection_uses_configured_host() {
        let normalized = StandardUrlNormalizer::new("example.org")
            .normalize(EXAMPLE, Operation::Redirection)
            .unwrap();
        assert_eq!(normalized, "https://example.org/food-experiences?query=abc/");
    }

    #[test]
    fn malformed_input_fails_before_transform() {
        let report = StandardUrlNormalizer::default()
            .normalize("%%%invalid-url", Operation::All)
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::MalformedUrl);
        assert_eq!(report.downcast_ref::<ParseStage>(), Some(&ParseStage::Input));
    }

    #[test]
    fn all_fails_when_canonical_form_does_not_parse() {
        // Trimming the decoded path exposes `//a:x`, an authority with a bad port.
        let cases = [("/%2Fa:x/", "//a:x"), ("http:/%2Fa:x/", "http://a:x")];
        for (raw, canonical) in cases {
            assert_eq!(normalize(raw, Operation::Canonical), canonical);
            let report = StandardUrlNormalizer::default()
                .normalize(raw, Operation::All)
                .unwrap_err();
            assert_eq!(report.current_context(), &KernelError::MalformedUrl);
            assert_eq!(
                report.downcast_ref::<ParseStage>(),
                Some(&ParseStage::Canonicalized),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn request_uri_must_be_absolute_or_rooted() {
        assert!(is_request_uri("https://byfood.com/food"));
        assert!(is_request_uri("/food"));
        assert!(!is_request_uri("bad-url"));
        assert!(!is_request_uri(""));
    }

    #[test]
    fn every_operation_is_idempotent() {
        let urls = [
            EXAMPLE,
            "",
            "/",
            "?page=2",
            "https://byfood.com",
            "HTTP://User@Example.COM:8080/A//B///?x=1#Frag",
            "https://www.byfood.com/food-experiences",
            "http://example.com/Path%2FWith%20Escapes/",
            "https://x.com/%41BC",
            "http://bücher.de/Katalog/",
            "Food/Menu",
            "urn:Example",
        ];
        let normalizer = StandardUrlNormalizer::default();
        for url in urls {
            for operation in [Operation::Canonical, Operation::Redirection, Operation::All] {
                let once = normalizer.normalize(url, operation).unwrap();
                let twice = normalizer.normalize(&once, operation).unwrap();
                assert_eq!(once, twice, "{operation} on {url}");
            }
        }
    }
}
