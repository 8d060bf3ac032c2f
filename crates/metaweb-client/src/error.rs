//! Client error types

use thiserror::Error;

use crate::envelope::{ErrorEnvelope, Message};

#[derive(Error, Debug)]
pub enum ClientError {
    /// The service was reached and reported failure in its own envelope.
    #[error("{}", service_line(.url, .details))]
    Service {
        /// Full URL of the failed request, query string included.
        url: String,
        details: ErrorEnvelope,
    },

    /// The service was reached but the response body was not a JSON
    /// envelope. This is a contract violation on the server side, never a
    /// normal rejection.
    #[error("{}: Unparseable response: {}", strip_params(.url), .body)]
    Internal { url: String, body: String },

    /// Transport failure, passed through from the HTTP layer unchanged.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Request-side serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// URL of the failed request, when the service was reached at all.
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::Service { url, .. } | ClientError::Internal { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Failure envelope, synthesizing one for unparseable bodies.
    pub fn details(&self) -> Option<ErrorEnvelope> {
        match self {
            ClientError::Service { details, .. } => Some(details.clone()),
            ClientError::Internal { body, .. } => Some(ErrorEnvelope {
                code: "Internal service error".to_string(),
                messages: vec![Message {
                    code: "Unparseable response".to_string(),
                    message: body.clone(),
                }],
            }),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ClientError::Internal { .. })
    }
}

/// `<url-without-params>: <first-message-code>: <first-message-text>`
fn service_line(url: &str, details: &ErrorEnvelope) -> String {
    let prefix = strip_params(url);
    match details.messages.first() {
        Some(message) => format!("{prefix}: {}: {}", message.code, message.message),
        None => format!("{prefix}: {}", details.code),
    }
}

/// Query parameters carry the serialized query itself, so they are dropped
/// from error messages.
fn strip_params(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
