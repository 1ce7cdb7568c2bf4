//! flock-bot
//!
//! Command line bot that fetches follower and friend listings, metered the
//! way the remote API rates requests. Lifecycle:
//! 1. Parse the command line into a run plan
//! 2. Load configuration, then credentials, and authenticate
//! 3. Submit one job per listing or friendship change across two fixed
//!    worker pools, each drawing permits from its own quota window
//! 4. Drain every job; a shutdown signal closes the windows so blocked
//!    jobs unwind with partial results and the drain still completes

mod cli;
mod config;
mod jobs;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use flock_api::{HttpExecutor, Mutator, Paginator, RecordStore};
use flock_auth::{CredentialProvider, Credentials};
use flock_pool::{Dispatcher, QuotaWindow};

use crate::cli::{Cli, Invocation};
use crate::config::Config;
use crate::jobs::BotContext;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let invocation = match Cli::try_parse() {
        Ok(cli) => cli.interpret(),
        Err(e) => e.exit(),
    };
    let plan = match invocation {
        Invocation::Run(plan) => plan,
        Invocation::Unsupported { option } => {
            error!(option, "option is not yet supported");
            std::process::exit(2);
        }
    };

    info!(account = %plan.account, "starting flock-bot");

    let config_path = Config::resolve_path(plan.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!(
        base_url = %config.api.base_url,
        page_size = config.api.page_size,
        read_capacity = config.quota.read_capacity,
        write_capacity = config.quota.write_capacity,
        window_secs = config.quota.window_secs,
        query_workers = config.pools.query_workers,
        mutation_workers = config.pools.mutation_workers,
        "configuration loaded"
    );

    let credentials = Credentials::load(&config.account.credentials_file)
        .await
        .context("failed to load credentials")?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("failed to build http client")?;

    let credentials = CredentialProvider::authenticate(&client, &config.api.token_url, credentials)
        .await
        .context("authentication failed")?;

    if plan.is_empty() {
        info!("no listings or friendship changes requested");
        return Ok(());
    }

    let window = Duration::from_secs(config.quota.window_secs);
    let read_window = Arc::new(QuotaWindow::new("read", config.quota.read_capacity, window));
    let write_window = Arc::new(QuotaWindow::new("write", config.quota.write_capacity, window));

    let executor = Arc::new(HttpExecutor::new(client));
    let ctx = Arc::new(BotContext {
        paginator: Paginator::new(
            executor.clone(),
            read_window.clone(),
            config.api.base_url.clone(),
            config.api.page_size,
            config.api.max_pages,
        ),
        mutator: Mutator::new(executor, write_window.clone(), config.api.base_url.clone()),
        store: RecordStore::new(config.api.data_dir.clone()),
        credentials,
    });

    let mut dispatcher = Dispatcher::new(config.pools.query_workers, config.pools.mutation_workers);
    info!(
        listings = plan.pagination.len(),
        changes = plan.mutations.len(),
        "dispatching jobs"
    );
    for (target, kind) in plan.pagination {
        let label = format!("{kind} {target}");
        dispatcher.submit_pagination(label, jobs::run_pagination_job(ctx.clone(), target, kind));
    }
    for (target, action) in plan.mutations {
        let label = format!("{action} {target}");
        dispatcher.submit_mutation(label, jobs::run_mutation_job(ctx.clone(), target, action));
    }

    // First signal closes the quota windows so blocked jobs unwind with
    // partial results; a second signal exits immediately.
    tokio::spawn({
        let read_window = read_window.clone();
        let write_window = write_window.clone();
        async move {
            shutdown_signal().await;
            info!("closing quota windows, jobs will unwind");
            read_window.close();
            write_window.close();
            shutdown_signal().await;
            warn!("second shutdown signal, exiting immediately");
            std::process::exit(130);
        }
    });

    dispatcher.drain().await;
    info!("finished flock-bot");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
