//! Typed failures for every external collaborator the pipeline talks to.
//!
//! Stage failures never escape the pipeline: they are captured in the
//! [`Report`](crate::pipeline::Report) and rendered inline.

use crate::language::SupportedLanguage;
use thiserror::Error;

/// A failed call to an HTTP-backed service (translation, generation, definitions).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} API error ({status}): {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unexpected response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub(crate) fn transport(service: &'static str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("timed out: {}", err)
        } else {
            err.to_string()
        };
        ServiceError::Transport { service, message }
    }

    pub(crate) fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Malformed {
            service,
            message: message.into(),
        }
    }

    /// HTTP status of the failed call, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transient failures (rate limit, 5xx, network) are worth retrying.
    /// Other 4xx answers and unparseable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Transport { .. } => true,
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Malformed { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Invalid input: Please enter a valid word or phrase.")]
    EmptyInput,

    #[error("Translation from {from} to {to} failed: {source}")]
    Service {
        from: &'static str,
        to: &'static str,
        #[source]
        source: ServiceError,
    },
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("{0} is not supported for enrichment")]
    UnsupportedLanguage(SupportedLanguage),

    #[error("no enrichment source is available for {0}")]
    Unavailable(SupportedLanguage),

    #[error("synonym generation failed: {0}")]
    Generation(#[from] ServiceError),
}

/// The only failure that rejects a whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Please enter a valid word or phrase to process.")]
    EmptyInput,

    #[error("Input is too long: please enter at most {limit} characters.")]
    InputTooLong { limit: usize },
}
