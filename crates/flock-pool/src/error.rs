//! Error types for quota operations

/// Errors from quota operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("quota window closed, acquire cancelled")]
    Cancelled,
}

/// Result alias for quota operations.
pub type Result<T> = std::result::Result<T, Error>;
