use crate::DecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] ledgr_http::Error),

    /// Response body did not decode under the request's policy. Passed through unchanged.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("node responded with http {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid node url `{0}`")]
    InvalidBaseUrl(String),

    #[error("blocking request issued from inside an async runtime; use the async API instead")]
    BlockingInRuntime,

    #[error("failed to start request runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// The decode failure behind this error, if any.
    #[must_use]
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}
