//! Error types for API operations
//!
//! Each variant scopes a failure to the job that hit it. Nothing here is
//! fatal to the process; fatal authentication failures live in flock-auth
//! and are raised before any job is dispatched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be executed or its body could not be read.
    /// Also covers non-2xx statuses, which this API only produces when
    /// something is wrong with the request itself.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body did not match the expected wire shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A record store file could not be read, written, or decoded.
    #[error("record store error: {0}")]
    Store(String),

    /// The quota window closed under this job during shutdown.
    #[error("cancelled by shutdown")]
    Cancelled,
}

impl From<flock_pool::Error> for Error {
    fn from(value: flock_pool::Error) -> Self {
        match value {
            flock_pool::Error::Cancelled => Self::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::Transport("GET /followers failed: connection refused".into());
        assert!(err.to_string().contains("connection refused"));

        let err = Error::Parse("followers page for alice: expected value".into());
        assert!(err.to_string().starts_with("parse error"));
    }

    #[test]
    fn pool_cancellation_converts() {
        let err: Error = flock_pool::Error::Cancelled.into();
        assert!(matches!(err, Error::Cancelled));
    }
}
