use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    NotFound,
    Timeout,
    Cancelled,
    Internal,
    InvalidOperation,
    MalformedUrl,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound => write!(f, "Resource not found"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Cancelled => write!(f, "Process cancelled"),
            KernelError::Internal => write!(f, "Internal kernel error"),
            KernelError::InvalidOperation => write!(f, "Invalid operation type"),
            KernelError::MalformedUrl => write!(f, "Malformed url"),
        }
    }
}

impl Context for KernelError {}
