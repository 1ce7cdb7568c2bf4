//! Shared types for the flock workspace

mod secret;
mod error;

pub use secret::Secret;
pub use error::{Error, Result};
