//! Social API authentication library
//!
//! Provides credential loading, the application-only bearer token flow, and
//! signed write-request headers for the flock bot. This crate is a standalone
//! library with no dependency on the bot binary — it can be tested and used
//! independently.
//!
//! Credential flow:
//! 1. Bot loads key material via `credentials::Credentials::load()`
//! 2. Bot calls `CredentialProvider::authenticate()` once at startup, which
//!    POSTs the consumer key pair to the token endpoint and caches the
//!    returned bearer token for the life of the process
//! 3. Read requests attach `CredentialProvider::read_authorization_header()`
//! 4. Write requests attach `CredentialProvider::write_authorization_header()`,
//!    which carries a fresh nonce per call over a signature computed once

pub mod constants;
pub mod credentials;
pub mod error;
pub mod signature;
pub mod token;

pub use constants::*;
pub use credentials::{CredentialProvider, Credentials};
pub use error::{Error, Result};
pub use signature::{generate_nonce, hmac_sha1_base64};
pub use token::{TokenResponse, basic_credentials, request_bearer_token};
