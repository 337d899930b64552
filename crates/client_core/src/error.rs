use thiserror::Error;

/// Failure of a single API call. Display renders only the human-readable
/// message so callers can embed it in their own status text.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, aborted body).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status; `message` is already
    /// resolved from the response body (`detail` / `message` / raw text).
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// A 2xx response whose body did not match the endpoint's schema.
    #[error("invalid response payload: {reason}")]
    Decode { reason: String },
}

impl ClientError {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// HTTP status for remote failures, if this was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
