//! Follow and unfollow mutations
//!
//! One `Mutator::apply` call is one request under one permit from the
//! write-quota window, which is independent of the read window the
//! `Paginator` draws from. The API acknowledges these calls with a user
//! object the bot has no further use for, so the body is only checked for
//! being present and well formed.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};

use flock_pool::QuotaWindow;

use crate::error::{Error, Result};
use crate::transport::{RequestExecutor, auth_headers};

/// Direction of a friendship change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    Follow,
    Unfollow,
}

impl FriendAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendAction::Follow => "follow",
            FriendAction::Unfollow => "unfollow",
        }
    }

    fn route(&self) -> &'static str {
        match self {
            FriendAction::Follow => "friendships/create.json",
            FriendAction::Unfollow => "friendships/destroy.json",
        }
    }

    fn query(&self, account: &str) -> String {
        match self {
            FriendAction::Follow => format!("screen_name={account}&follow=true"),
            FriendAction::Unfollow => format!("screen_name={account}"),
        }
    }
}

impl fmt::Display for FriendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation engine for friendship changes.
pub struct Mutator {
    executor: Arc<dyn RequestExecutor>,
    window: Arc<QuotaWindow>,
    base_url: String,
}

impl Mutator {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        window: Arc<QuotaWindow>,
        base_url: String,
    ) -> Self {
        Self {
            executor,
            window,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Apply one friendship change to `account`.
    ///
    /// Draws one write permit, posts the change, and checks the
    /// acknowledgement. The holder of the window's last permit refills it
    /// before returning, whatever the outcome; a shutdown landing during
    /// that hold does not undo a mutation that already went out.
    pub async fn apply(
        &self,
        account: &str,
        action: FriendAction,
        write_authorization: &str,
    ) -> Result<()> {
        let permit = self.window.acquire().await?;
        debug!(account, action = %action, permit, "applying friendship change");
        let outcome = self.post_change(account, action, write_authorization).await;
        if self.window.is_last(permit) {
            let _ = self.window.wait_and_reset().await;
        }
        outcome
    }

    async fn post_change(
        &self,
        account: &str,
        action: FriendAction,
        authorization: &str,
    ) -> Result<()> {
        let url = format!("{}/{}?{}", self.base_url, action.route(), action.query(account));
        let response = self
            .executor
            .execute(Method::POST, &url, auth_headers(authorization)?, None)
            .await?;
        if !response.is_success() {
            return Err(Error::Transport(format!(
                "{action} for {account} returned status {}",
                response.status
            )));
        }
        if response.is_empty() {
            return Err(Error::Parse(format!(
                "{action} for {account} returned an empty acknowledgement"
            )));
        }
        serde_json::from_slice::<serde_json::Value>(&response.body)
            .map_err(|e| Error::Parse(format!("{action} acknowledgement for {account}: {e}")))?;
        info!(account, action = %action, "friendship change acknowledged");
        Ok(())
    }
}
