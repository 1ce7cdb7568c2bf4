//! Application-only token acquisition
//!
//! The read path authenticates with an application-only bearer token: the
//! consumer key pair is form-encoded, joined `key:secret`, base64-encoded
//! and sent as a `Basic` header to the token endpoint with the
//! `client_credentials` grant. The endpoint answers with a token that is
//! valid for the rest of the run — there is no refresh.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::constants::EXPECTED_TOKEN_TYPE;
use crate::error::{Error, Result};

/// Response from the token endpoint.
///
/// `token_type` must be `bearer` (the endpoint spells it lowercase, but the
/// check is case-insensitive); any other type means the credentials are not
/// enabled for application-only access.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}

/// Build the base64 credential pair sent in the token request's Basic header.
///
/// `base64(formenc(consumer_key) ":" formenc(consumer_secret))` — the key and
/// secret are individually form-encoded before joining, per the API's
/// application-only documentation.
pub fn basic_credentials(consumer_key: &str, consumer_secret: &str) -> String {
    let pair = format!(
        "{}:{}",
        form_encode(consumer_key),
        form_encode(consumer_secret)
    );
    STANDARD.encode(pair.as_bytes())
}

/// Request an application-only bearer token.
///
/// POSTs `grant_type=client_credentials` (form-encoded) with the Basic
/// credential header. Any failure here — transport, non-2xx status,
/// malformed body, wrong token type — is an authentication failure, which
/// the bot treats as fatal before dispatching any jobs.
pub async fn request_bearer_token(
    client: &reqwest::Client,
    token_url: &str,
    basic_credentials: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Basic {basic_credentials}"),
        )
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Authentication(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Authentication(format!("invalid token response: {e}")))?;

    if !token.token_type.eq_ignore_ascii_case(EXPECTED_TOKEN_TYPE) {
        return Err(Error::Authentication(format!(
            "unexpected token type: {}",
            token.token_type
        )));
    }

    Ok(token)
}

/// Form-encode one credential component.
/// Unreserved characters pass through, space becomes `+`, everything else
/// becomes a percent-escaped UTF-8 byte sequence.
fn form_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'*' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
