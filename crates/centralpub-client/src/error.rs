use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;

/// A response outside the 2xx range.
///
/// Kept separate from connectivity failures so the poller can tell a
/// rejected request from an unreachable service.
#[derive(Debug, Error)]
#[error("HTTP {status}: {body}")]
pub struct TransportError {
    pub status: StatusCode,
    pub body: String,
}

impl TransportError {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

/// Errors raised by the publisher client.
#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    #[error("Publishing service rejected the request")]
    #[diagnostic(help("Check the credentials and the deployment id"))]
    Transport(#[source] TransportError),

    #[error("Could not reach the publishing service")]
    #[diagnostic(help("Check your network connection and the publisher URL"))]
    Connectivity(#[source] reqwest::Error),

    #[error("Invalid publisher URI: {message}")]
    InvalidUri { message: String },

    #[error("Unexpected response from the publishing service: {message}")]
    Decode { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Usage { message: String },
}

impl ClientError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// The status code of a rejected request, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(e) => Some(e.status),
            _ => None,
        }
    }
}
