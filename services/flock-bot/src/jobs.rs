//! Job bodies and the run plan they execute
//!
//! A pagination job fetches one complete listing and saves it through the
//! record store; a mutation job applies one friendship change and only
//! logs the outcome. Failures stay inside the job: they are logged here at
//! the job boundary and never abort sibling jobs or the final drain.

use std::path::PathBuf;
use std::sync::Arc;

use flock_api::{Error, FriendAction, Mutator, Paginator, QueryKind, RecordStore};
use flock_auth::CredentialProvider;
use tracing::{error, info, warn};

/// The work a single invocation performs.
#[derive(Debug, PartialEq)]
pub struct RunPlan {
    /// Screen name the run authenticates as.
    pub account: String,
    /// Config file override from the command line.
    pub config: Option<PathBuf>,
    /// Listings to fetch, one pagination job each.
    pub pagination: Vec<(String, QueryKind)>,
    /// Friendship changes to apply, one mutation job each.
    pub mutations: Vec<(String, FriendAction)>,
}

impl RunPlan {
    pub fn is_empty(&self) -> bool {
        self.pagination.is_empty() && self.mutations.is_empty()
    }
}

/// Everything a job needs, shared across both worker pools.
pub struct BotContext {
    pub paginator: Paginator,
    pub mutator: Mutator,
    pub store: RecordStore,
    pub credentials: CredentialProvider,
}

/// Fetch one complete listing and persist it.
///
/// A listing cut short by shutdown is reported but not written; the store
/// only ever holds complete listings.
pub async fn run_pagination_job(ctx: Arc<BotContext>, account: String, kind: QueryKind) {
    info!(%account, %kind, "fetching listing");
    let authorization = ctx.credentials.read_authorization_header();
    match ctx.paginator.fetch_all(&account, kind, &authorization).await {
        Ok(outcome) if outcome.complete => {
            match ctx.store.save(&account, kind, &outcome.records).await {
                Ok(path) => info!(
                    %account,
                    %kind,
                    records = outcome.records.len(),
                    path = %path.display(),
                    "listing saved"
                ),
                Err(e) => error!(%account, %kind, error = %e, "saving listing failed"),
            }
        }
        Ok(outcome) => warn!(
            %account,
            %kind,
            fetched = outcome.records.len(),
            "listing incomplete after shutdown, not saved"
        ),
        Err(e) => error!(%account, %kind, error = %e, "fetching listing failed"),
    }
}

/// Apply one friendship change. The acknowledgement is logged, never
/// persisted.
pub async fn run_mutation_job(ctx: Arc<BotContext>, account: String, action: FriendAction) {
    info!(%account, %action, "applying friendship change");
    let authorization = ctx.credentials.write_authorization_header();
    match ctx.mutator.apply(&account, action, &authorization).await {
        Ok(()) => info!(%account, %action, "friendship change applied"),
        Err(Error::Cancelled) => {
            info!(%account, %action, "friendship change cancelled by shutdown");
        }
        Err(e) => error!(%account, %action, error = %e, "friendship change failed"),
    }
}
