use application::transfer::ProcessUrlDto;
use kernel::interface::normalize::{is_request_uri, Operation};
use serde::Deserialize;

use crate::controller::TryIntake;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ProcessUrlRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    operation: String,
}

pub struct UrlTransformer;

impl TryIntake<ProcessUrlRequest> for UrlTransformer {
    type To = ProcessUrlDto;
    type Error = ValidationError;
    fn emit(&self, input: ProcessUrlRequest) -> Result<Self::To, Self::Error> {
        let operation = input.operation.to_lowercase();

        let mut validation = ValidationError::default();
        validation.check(!input.url.is_empty(), "url", "url must be provided");
        validation.check(is_request_uri(&input.url), "url", "url must be a valid URL");
        validation.check(
            operation.parse::<Operation>().is_ok(),
            "operation",
            "operation must be one of 'canonical', 'redirection', or 'all'",
        );

        validation.into_result(ProcessUrlDto {
            url: input.url,
            operation,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::controller::TryIntake;
    use crate::request::{ProcessUrlRequest, UrlTransformer};

    #[test]
    fn operation_is_lower_cased() {
        let dto = UrlTransformer
            .emit(ProcessUrlRequest {
                url: "https://byfood.com".to_string(),
                operation: "ALL".to_string(),
            })
            .unwrap();
        assert_eq!(dto.operation, "all");
    }

    #[test]
    fn empty_url_and_unknown_operation_are_rejected() {
        let error = UrlTransformer
            .emit(ProcessUrlRequest {
                url: String::new(),
                operation: "compress".to_string(),
            })
            .unwrap_err();
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["fields"]["url"], "url must be provided");
        assert_eq!(
            json["fields"]["operation"],
            "operation must be one of 'canonical', 'redirection', or 'all'"
        );
    }

    #[test]
    fn url_must_be_absolute_or_rooted() {
        for url in ["bad-url", "food/menu", "%%%invalid-url"] {
            let error = UrlTransformer
                .emit(ProcessUrlRequest {
                    url: url.to_string(),
                    operation: "all".to_string(),
                })
                .unwrap_err();
            let json = serde_json::to_value(&error).unwrap();
            assert_eq!(json["fields"]["url"], "url must be a valid URL", "{url:?}");
        }
        for url in ["https://byfood.com/food", "/food?page=2"] {
            let request = ProcessUrlRequest {
                url: url.to_string(),
                operation: "all".to_string(),
            };
            assert!(UrlTransformer.emit(request).is_ok(), "{url:?}");
        }
    }
}
