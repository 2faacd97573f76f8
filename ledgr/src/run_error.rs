use ledgr_core::{DecodeErrorKind, Error};

use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    PrecisionLoss(anyhow::Error),
    RequestFailed(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::PrecisionLoss(_) => ExitCode::PrecisionLoss,
            Self::RequestFailed(_) => ExitCode::RequestFailed,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e)
            | Self::PrecisionLoss(e)
            | Self::RequestFailed(e)
            | Self::RuntimeError(e) => e,
        }
    }

    /// Classify a client error, attaching `context` to the message.
    pub fn from_client(err: Error, context: &'static str) -> Self {
        let kind = match &err {
            Error::Decode(decode) => Some(decode.kind()),
            _ => None,
        };
        let request_failed = matches!(
            err,
            Error::Http(_) | Error::Status { .. } | Error::UnexpectedResponse(_)
        );
        let invalid_input = matches!(err, Error::InvalidBaseUrl(_));
        let err = anyhow::Error::new(err).context(context);

        match kind {
            Some(DecodeErrorKind::PrecisionLoss) => Self::PrecisionLoss(err),
            Some(DecodeErrorKind::Syntax | DecodeErrorKind::NumberOutOfRange) => {
                Self::InvalidInput(err)
            }
            None if request_failed => Self::RequestFailed(err),
            None if invalid_input => Self::InvalidInput(err),
            None => Self::RuntimeError(err),
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.anyhow())
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}
