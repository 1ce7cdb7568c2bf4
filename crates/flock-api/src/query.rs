//! Cursor pagination over the user listing endpoints
//!
//! One `Paginator` walks a followers or friends listing page by page:
//!
//! 1. Draw a permit from the shared read-quota window.
//! 2. Request the page at the current cursor.
//! 3. Append its records and advance the cursor.
//! 4. If the permit was the window's last, hold until the window resets.
//! 5. Stop when the API returns an empty body or a zero cursor.
//!
//! Step 4 runs no matter how the page turned out, even on a failed or
//! final page: the holder of the last permit is the only task allowed to
//! refill the window, and sibling jobs stay blocked in `acquire` until it
//! does.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use flock_pool::QuotaWindow;

use crate::error::{Error, Result};
use crate::transport::{RequestExecutor, auth_headers};
use crate::wire::{UserPage, UserRecord};

/// Which side of the social graph a pagination run walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Followers,
    Friends,
}

impl QueryKind {
    /// Label used in file names and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Followers => "followers",
            QueryKind::Friends => "friends",
        }
    }

    fn route(&self) -> &'static str {
        match self {
            QueryKind::Followers => "followers/list.json",
            QueryKind::Friends => "friends/list.json",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records accumulated by one pagination run.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Users in arrival order: page order, then within-page API order.
    pub records: Vec<UserRecord>,
    /// False when shutdown cut the run short.
    pub complete: bool,
}

/// Pagination engine for the cursored user listing endpoints.
pub struct Paginator {
    executor: Arc<dyn RequestExecutor>,
    window: Arc<QuotaWindow>,
    base_url: String,
    page_size: u32,
    max_pages: u32,
}

impl Paginator {
    /// `max_pages` bounds runaway cursor loops; `0` disables the bound.
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        window: Arc<QuotaWindow>,
        base_url: String,
        page_size: u32,
        max_pages: u32,
    ) -> Self {
        Self {
            executor,
            window,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
            max_pages,
        }
    }

    /// Fetch every page of `kind` for `account`.
    ///
    /// Transport and parse failures are terminal for this run and propagate
    /// as errors. Shutdown is not an error: the outcome carries whatever
    /// was accumulated, marked incomplete. No de-duplication is performed;
    /// records arrive in page order.
    pub async fn fetch_all(
        &self,
        account: &str,
        kind: QueryKind,
        read_authorization: &str,
    ) -> Result<FetchOutcome> {
        let mut records: Vec<UserRecord> = Vec::new();
        let mut cursor: i64 = -1;
        let mut pages: u32 = 0;
        info!(account, kind = %kind, "pagination started");
        loop {
            let permit = match self.window.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    info!(
                        account,
                        kind = %kind,
                        fetched = records.len(),
                        "pagination cancelled while waiting for a read permit"
                    );
                    return Ok(FetchOutcome { records, complete: false });
                }
            };
            debug!(account, kind = %kind, permit, cursor, "fetching page");
            let step = self.fetch_page(account, kind, cursor, read_authorization).await;
            let hold_cut_short = self.window.is_last(permit)
                && self.window.wait_and_reset().await.is_err();
            let done = match step? {
                None => {
                    debug!(account, kind = %kind, "empty page response, end of listing");
                    true
                }
                Some(page) => {
                    cursor = page.next_cursor;
                    records.extend(page.users);
                    pages += 1;
                    cursor == 0
                }
            };
            // A shutdown landing during the final hold does not invalidate
            // an already complete listing.
            if done {
                break;
            }
            if hold_cut_short {
                info!(
                    account,
                    kind = %kind,
                    fetched = records.len(),
                    "pagination cancelled during window reset"
                );
                return Ok(FetchOutcome { records, complete: false });
            }
            if self.max_pages > 0 && pages >= self.max_pages {
                warn!(account, kind = %kind, pages, "page bound reached, stopping early");
                break;
            }
        }
        info!(account, kind = %kind, fetched = records.len(), "pagination finished");
        Ok(FetchOutcome { records, complete: true })
    }

    /// One page request. `None` is the API's empty-body end-of-listing
    /// signal.
    async fn fetch_page(
        &self,
        account: &str,
        kind: QueryKind,
        cursor: i64,
        authorization: &str,
    ) -> Result<Option<UserPage>> {
        let url = format!(
            "{}/{}?screen_name={}&count={}&cursor={}",
            self.base_url,
            kind.route(),
            account,
            self.page_size,
            cursor
        );
        let response = self
            .executor
            .execute(Method::GET, &url, auth_headers(authorization)?, None)
            .await?;
        if !response.is_success() {
            return Err(Error::Transport(format!(
                "{kind} page for {account} returned status {}",
                response.status
            )));
        }
        if response.is_empty() {
            return Ok(None);
        }
        let page = serde_json::from_slice(&response.body)
            .map_err(|e| Error::Parse(format!("{kind} page for {account}: {e}")))?;
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedExecutor, page_body};
    use std::time::Duration;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_secs(900);

    fn paginator(executor: Arc<ScriptedExecutor>, window: Arc<QuotaWindow>) -> Paginator {
        Paginator::new(executor, window, "http://api.test/1.1".into(), 200, 0)
    }

    fn screen_names(outcome: &FetchOutcome) -> Vec<&str> {
        outcome.records.iter().map(|u| u.screen_name.as_str()).collect()
    }

    #[tokio::test]
    async fn three_pages_concatenate_in_order_and_stop_at_zero_cursor() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ScriptedExecutor::ok(200, &page_body(100, &["a", "b"])),
            ScriptedExecutor::ok(200, &page_body(200, &["c", "d"])),
            ScriptedExecutor::ok(200, &page_body(0, &["e"])),
        ]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        let outcome = paginator(executor.clone(), window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await
            .unwrap();

        assert!(outcome.complete);
        assert_eq!(screen_names(&outcome), ["a", "b", "c", "d", "e"]);

        let seen = executor.seen();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[0],
            "GET http://api.test/1.1/followers/list.json?screen_name=alice&count=200&cursor=-1"
        );
        assert!(seen[1].ends_with("cursor=100"));
        assert!(seen[2].ends_with("cursor=200"));
        assert!(
            executor
                .authorizations()
                .iter()
                .all(|a| a.as_deref() == Some("Bearer t"))
        );
    }

    #[tokio::test]
    async fn empty_first_response_ends_the_listing_without_error() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(200, "")]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        let outcome = paginator(executor.clone(), window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await
            .unwrap();

        assert!(outcome.complete);
        assert!(outcome.records.is_empty());
        assert_eq!(executor.seen().len(), 1);
    }

    #[tokio::test]
    async fn friends_listing_uses_the_friends_route() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(
            200,
            &page_body(0, &["f"]),
        )]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        paginator(executor.clone(), window)
            .fetch_all("alice", QueryKind::Friends, "Bearer t")
            .await
            .unwrap();

        assert!(executor.seen()[0].contains("/friends/list.json?"));
    }

    #[tokio::test]
    async fn transport_error_is_terminal_for_the_run() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ScriptedExecutor::ok(200, &page_body(100, &["a"])),
            Err(Error::Transport("connection reset".into())),
        ]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        let result = paginator(executor, window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn malformed_page_body_is_a_parse_error() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(
            200,
            "not json at all",
        )]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        let result = paginator(executor, window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await;

        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(
            429,
            r#"{"errors":[{"code":88}]}"#,
        )]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));

        let result = paginator(executor, window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await;

        match result {
            Err(Error::Transport(msg)) => assert!(msg.contains("429")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn last_permit_holds_for_the_full_window_before_the_next_page() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ScriptedExecutor::ok(200, &page_body(100, &["a"])),
            ScriptedExecutor::ok(200, &page_body(200, &["b"])),
            ScriptedExecutor::ok(200, &page_body(0, &["c"])),
        ]));
        let window = Arc::new(QuotaWindow::new("read", 2, WINDOW));
        let started = Instant::now();

        let outcome = paginator(executor.clone(), window)
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await
            .unwrap();

        assert!(outcome.complete);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(executor.seen().len(), 3);
        assert!(started.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_page_on_the_last_permit_still_refills_the_window() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Err(Error::Transport(
            "connection reset".into(),
        ))]));
        let window = Arc::new(QuotaWindow::new("read", 1, WINDOW));
        let started = Instant::now();

        let result = paginator(executor, window.clone())
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(started.elapsed() >= WINDOW);
        assert_eq!(window.acquire().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn shutdown_while_waiting_for_a_permit_returns_partial() {
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let window = Arc::new(QuotaWindow::new("read", 1, WINDOW));
        window.acquire().await.unwrap();

        let paginator = Arc::new(paginator(executor.clone(), window.clone()));
        let handle = tokio::spawn({
            let paginator = paginator.clone();
            async move { paginator.fetch_all("alice", QueryKind::Followers, "Bearer t").await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        window.close();

        let outcome = handle.await.unwrap().unwrap();
        assert!(!outcome.complete);
        assert!(outcome.records.is_empty());
        assert!(executor.seen().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_the_window_hold_returns_partial() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(
            200,
            &page_body(42, &["a"]),
        )]));
        let window = Arc::new(QuotaWindow::new("read", 1, WINDOW));

        let paginator = Arc::new(paginator(executor.clone(), window.clone()));
        let handle = tokio::spawn({
            let paginator = paginator.clone();
            async move { paginator.fetch_all("alice", QueryKind::Followers, "Bearer t").await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        window.close();

        let outcome = handle.await.unwrap().unwrap();
        assert!(!outcome.complete);
        assert_eq!(screen_names(&outcome), ["a"]);
        assert_eq!(executor.seen().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn final_page_survives_shutdown_during_the_hold() {
        let executor = Arc::new(ScriptedExecutor::new(vec![ScriptedExecutor::ok(
            200,
            &page_body(0, &["a"]),
        )]));
        let window = Arc::new(QuotaWindow::new("read", 1, WINDOW));

        let paginator = Arc::new(paginator(executor.clone(), window.clone()));
        let handle = tokio::spawn({
            let paginator = paginator.clone();
            async move { paginator.fetch_all("alice", QueryKind::Followers, "Bearer t").await }
        });
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        window.close();

        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.complete);
        assert_eq!(screen_names(&outcome), ["a"]);
    }

    #[tokio::test]
    async fn page_bound_stops_a_cursor_loop() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            ScriptedExecutor::ok(200, &page_body(7, &["a"])),
            ScriptedExecutor::ok(200, &page_body(7, &["b"])),
        ]));
        let window = Arc::new(QuotaWindow::new("read", 30, WINDOW));
        let paginator = Paginator::new(executor.clone(), window, "http://api.test/1.1".into(), 200, 2);

        let outcome = paginator
            .fetch_all("alice", QueryKind::Followers, "Bearer t")
            .await
            .unwrap();

        assert!(outcome.complete);
        assert_eq!(screen_names(&outcome), ["a", "b"]);
        assert_eq!(executor.seen().len(), 2);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let window = Arc::new(QuotaWindow::new("read", 1, WINDOW));
        let paginator = Paginator::new(executor, window, "http://api.test/1.1/".into(), 200, 0);
        assert_eq!(paginator.base_url, "http://api.test/1.1");
    }
}
