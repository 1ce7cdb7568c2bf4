//! Authentication constants
//!
//! Endpoint and header-shape constants for the social API's auth surface.
//! None of these are secrets — the actual key material lives in the
//! credentials file and environment, wrapped in `common::Secret`.

/// Default token endpoint for the application-only (bearer) flow
pub const DEFAULT_TOKEN_URL: &str = "https://api.twitter.com/oauth2/token";

/// Token type the endpoint must return for the bearer flow to be usable
pub const EXPECTED_TOKEN_TYPE: &str = "bearer";

/// Signature method advertised in the signed write header
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol version advertised in the signed write header
pub const OAUTH_VERSION: &str = "1.0";

/// Length in characters of the per-request nonce
pub const NONCE_LENGTH: usize = 32;

/// Environment variables that override individual credentials-file fields
pub const ENV_CONSUMER_KEY: &str = "FLOCK_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "FLOCK_CONSUMER_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "FLOCK_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "FLOCK_ACCESS_TOKEN_SECRET";
