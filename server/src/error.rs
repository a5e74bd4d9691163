use std::collections::BTreeMap;
use std::process::{ExitCode, Termination};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::KernelError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

/// Field name to the first problem found with it.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct ValidationError {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    /// Records `message` for `field` unless `ok` holds. Only the first message per field is kept.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.fields.entry(field).or_insert_with(|| message.into());
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.fields.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a BTreeMap<&'static str, String>>,
}

#[derive(Debug)]
pub enum ErrorStatus {
    Kernel(Report<KernelError>),
    Validation(ValidationError),
}

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus::Kernel(e)
    }
}

impl From<ValidationError> for ErrorStatus {
    fn from(e: ValidationError) -> Self {
        ErrorStatus::Validation(e)
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        match self {
            ErrorStatus::Kernel(report) => {
                let status = match report.current_context() {
                    KernelError::NotFound => StatusCode::NOT_FOUND,
                    KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
                    KernelError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                    KernelError::InvalidOperation | KernelError::MalformedUrl => {
                        StatusCode::BAD_REQUEST
                    }
                    KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("{report:?}");
                }
                let body = ErrorBody {
                    error: report.current_context().to_string(),
                    fields: None,
                };
                (status, Json(body)).into_response()
            }
            ErrorStatus::Validation(validation) => {
                let body = ErrorBody {
                    error: "request failed validation".to_string(),
                    fields: Some(&validation.fields),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}
