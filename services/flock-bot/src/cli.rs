//! Command line surface
//!
//! `flock-bot <account> [--initial | --query=a,b,c]`. Parsing produces a
//! tagged [`Invocation`] that the caller inspects before any core logic
//! runs: a run plan to execute, or a rejection for flags whose pipeline is
//! not wired up yet. Malformed command lines surface through clap's own
//! error path and are the only failures reflected in the process exit code.

use std::path::PathBuf;

use clap::Parser;
use flock_api::QueryKind;

use crate::jobs::RunPlan;

#[derive(Parser, Debug)]
#[command(name = "flock-bot", version, about = "Social graph listing bot")]
pub struct Cli {
    /// Screen name the credentials authenticate as
    pub account: String,

    /// Fetch the authenticated account's own follower and friend listings
    #[arg(long)]
    pub initial: bool,

    /// Comma separated accounts to fetch follower listings for
    #[arg(long, value_name = "ACCOUNTS", value_delimiter = ',')]
    pub query: Vec<String>,

    /// Follow the stored followers of these accounts (not yet supported)
    #[arg(long, value_name = "ACCOUNTS", value_delimiter = ',')]
    pub follow: Vec<String>,

    /// Unfollow the stored followers of these accounts (not yet supported)
    #[arg(long, value_name = "ACCOUNTS", value_delimiter = ',')]
    pub unfollow: Vec<String>,

    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What a syntactically valid command line asks the bot to do.
#[derive(Debug, PartialEq)]
pub enum Invocation {
    Run(RunPlan),
    /// A recognised flag whose pipeline has no command line wiring yet.
    Unsupported { option: &'static str },
}

impl Cli {
    /// Turn parsed flags into a run plan.
    ///
    /// `--initial` takes precedence over `--query` when both are present.
    /// With neither, the plan is empty and the run stops after
    /// authenticating.
    pub fn interpret(self) -> Invocation {
        if !self.follow.is_empty() {
            return Invocation::Unsupported { option: "--follow" };
        }
        if !self.unfollow.is_empty() {
            return Invocation::Unsupported { option: "--unfollow" };
        }

        let mut pagination = Vec::new();
        if self.initial {
            pagination.push((self.account.clone(), QueryKind::Followers));
            pagination.push((self.account.clone(), QueryKind::Friends));
        } else {
            for target in self.query.iter().filter(|t| !t.is_empty()) {
                pagination.push((target.clone(), QueryKind::Followers));
            }
        }

        Invocation::Run(RunPlan {
            account: self.account,
            config: self.config,
            pagination,
            mutations: Vec::new(),
        })
    }
}
