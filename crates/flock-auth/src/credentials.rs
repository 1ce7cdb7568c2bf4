//! Credential material and the authenticated provider
//!
//! `Credentials` loads the consumer key pair (and, when present, the user
//! access token pair) from a TOML file, with per-field environment overrides
//! for deployments that keep secrets out of the filesystem. Precedence per
//! field: env var > file value.
//!
//! `CredentialProvider` performs the one-time application-only
//! authentication at startup and then hands out the read and write
//! authorization headers that jobs attach to requests. Authentication
//! failure is fatal to the run — no job is dispatched without a working
//! bearer token.

use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use common::Secret;
use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::{
    ENV_ACCESS_TOKEN, ENV_ACCESS_TOKEN_SECRET, ENV_CONSUMER_KEY, ENV_CONSUMER_SECRET,
    OAUTH_VERSION, SIGNATURE_METHOD,
};
use crate::error::{Error, Result};
use crate::signature::{generate_nonce, hmac_sha1_base64};
use crate::token::{basic_credentials, request_bearer_token};

/// On-disk shape of the credentials file.
#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    consumer_key: Option<String>,
    #[serde(default)]
    consumer_secret: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    access_token_secret: Option<String>,
}

/// Key material for one authenticated account.
///
/// The consumer pair is required — both the bearer flow and the signed write
/// header derive from it. The access token pair is accepted and carried for
/// completeness but not consulted by either header.
#[derive(Debug)]
pub struct Credentials {
    pub consumer_key: Secret<String>,
    pub consumer_secret: Secret<String>,
    pub access_token: Secret<String>,
    pub access_token_secret: Secret<String>,
}

impl Credentials {
    /// Load credentials from a TOML file, then overlay environment variables.
    ///
    /// The file may be absent entirely if the required fields arrive via
    /// environment. A missing or empty consumer key or secret is a
    /// credential parse error.
    pub async fn load(path: &Path) -> Result<Self> {
        let file = if path.exists() {
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::Io(format!("reading credentials file: {e}")))?;
            let parsed: CredentialsFile = toml::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing credentials file: {e}")))?;
            debug!(path = %path.display(), "loaded credentials file");
            parsed
        } else {
            debug!(path = %path.display(), "credentials file not found, relying on environment");
            CredentialsFile::default()
        };

        let consumer_key = required_field(ENV_CONSUMER_KEY, file.consumer_key, "consumer_key")?;
        let consumer_secret =
            required_field(ENV_CONSUMER_SECRET, file.consumer_secret, "consumer_secret")?;
        let access_token = optional_field(ENV_ACCESS_TOKEN, file.access_token);
        let access_token_secret = optional_field(ENV_ACCESS_TOKEN_SECRET, file.access_token_secret);

        Ok(Self {
            consumer_key: Secret::new(consumer_key),
            consumer_secret: Secret::new(consumer_secret),
            access_token: Secret::new(access_token),
            access_token_secret: Secret::new(access_token_secret),
        })
    }
}

fn required_field(env_key: &str, file_value: Option<String>, name: &str) -> Result<String> {
    if let Ok(value) = std::env::var(env_key)
        && !value.is_empty()
    {
        return Ok(value);
    }
    match file_value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::CredentialParse(format!(
            "missing credential field {name} (set {env_key} or add it to the credentials file)"
        ))),
    }
}

fn optional_field(env_key: &str, file_value: Option<String>) -> String {
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.is_empty())
        .or(file_value)
        .unwrap_or_default()
}

/// Authenticated credential provider.
///
/// Holds the bearer token acquired at startup and builds both authorization
/// headers. The write-header signature depends only on the consumer pair, so
/// it is computed on first use and cached for the rest of the process; the
/// nonce and timestamp are fresh on every call.
pub struct CredentialProvider {
    credentials: Credentials,
    basic: String,
    bearer_token: Secret<String>,
    signature: OnceLock<String>,
}

impl CredentialProvider {
    /// Authenticate against the token endpoint and capture the bearer token.
    pub async fn authenticate(
        client: &reqwest::Client,
        token_url: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        let basic = basic_credentials(
            credentials.consumer_key.expose_str(),
            credentials.consumer_secret.expose_str(),
        );
        let token = request_bearer_token(client, token_url, &basic).await?;
        info!("application-only bearer token acquired");
        Ok(Self {
            credentials,
            basic,
            bearer_token: Secret::new(token.access_token),
            signature: OnceLock::new(),
        })
    }

    /// Authorization header for read (application-authenticated) requests.
    pub fn read_authorization_header(&self) -> String {
        format!("Bearer {}", self.bearer_token.expose_str())
    }

    /// Authorization header for write (user-authenticated) requests.
    pub fn write_authorization_header(&self) -> String {
        let signature = self.signature.get_or_init(|| {
            hmac_sha1_base64(
                self.credentials.consumer_key.expose_str(),
                self.credentials.consumer_secret.expose_str(),
            )
        });
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_nonce=\"{}\", oauth_signature=\"{}\", \
             oauth_signature_method=\"{}\", oauth_timestamp=\"{}\", oauth_token=\"{}\", \
             oauth_version=\"{}\"",
            self.credentials.consumer_key.expose_str(),
            generate_nonce(),
            signature,
            SIGNATURE_METHOD,
            timestamp,
            self.basic,
            OAUTH_VERSION,
        )
    }
}
