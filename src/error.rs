use serde::Serialize;
use thiserror::Error;

/// Failure kinds for fetching, decoding and encoding a form.
///
/// Every variant carries the message shown to the end user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0}")]
    UpstreamUnavailable(String),
    #[error("{0}")]
    MarkerNotFound(String),
    #[error("{0}")]
    MalformedLiteral(String),
    #[error("{0}")]
    InvalidAnswerShape(String),
}

/// Tagged error body handed to whoever serializes responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: bool,
    pub kind: &'static str,
    pub message: String,
}

impl FormError {
    pub fn kind(&self) -> &'static str {
        match self {
            FormError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            FormError::MarkerNotFound(_) => "MarkerNotFound",
            FormError::MalformedLiteral(_) => "MalformedLiteral",
            FormError::InvalidAnswerShape(_) => "InvalidAnswerShape",
        }
    }

    /// Status a boundary layer maps this failure to: gateway errors for
    /// anything upstream, client errors for bad answers.
    pub fn http_status(&self) -> u16 {
        match self {
            FormError::InvalidAnswerShape(_) => 400,
            _ => 502,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: true,
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
