//! Shared error types
//!
//! Covers the failure surface of configuration and credential loading, which
//! both the binary and the auth crate report through the same variants.

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the shared Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let config_err = Error::Config("quota capacity must be positive".into());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: quota capacity must be positive"
        );

        let io_err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "credentials file not found",
        ));
        assert!(
            io_err.to_string().starts_with("I/O error:"),
            "got: {}",
            io_err
        );
    }

    #[test]
    fn toml_error_converts() {
        let parse_err = toml::from_str::<toml::Value>("not [ valid").unwrap_err();
        let err = Error::from(parse_err);
        assert!(
            err.to_string().starts_with("TOML parse error:"),
            "got: {}",
            err
        );
    }
}
