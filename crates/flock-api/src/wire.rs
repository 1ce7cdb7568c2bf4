//! Wire shapes for the social graph API
//!
//! Mirrors the JSON the listing endpoints return. `UserPage` is the
//! cursored envelope; `UserRecord` keeps only the per-user fields the bot
//! stores. The API sends many more fields per user, which serde drops.

use serde::{Deserialize, Serialize};

/// One user entry from a page response.
///
/// `location` is frequently absent or null upstream, so it stays optional
/// and round-trips as a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One page of a cursored user listing.
///
/// `next_cursor == 0` marks the final page. `previous_cursor` is part of
/// the envelope but pagination only ever walks forward.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    pub previous_cursor: i64,
    pub next_cursor: i64,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}
