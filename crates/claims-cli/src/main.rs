//! # claims CLI entry point
//!
//! Parses arguments, builds a `ClaimsService` from the environment and
//! dispatches one command. Output goes to stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use claims_cli::render;
use claims_client::BackendConfig;
use claims_core::{Decision, DisputeId, VendorReply};
use claims_engine::{ClaimsService, Outcome};

/// Exit code when the lifecycle refused the requested transition.
const EXIT_UNCHANGED: u8 = 2;

/// Claims operator CLI.
///
/// Lists and inspects disputes across the row store, the REST API and the
/// optional sample dataset; records approve/reject decisions; simulates
/// vendor replies; triggers inbox scans.
#[derive(Parser, Debug)]
#[command(name = "claims", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Serve the bundled sample dataset when every backend fails. Also
    /// enabled by `CLAIMS_SAMPLE_FALLBACK=true`.
    #[arg(long, global = true)]
    sample_fallback: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all disputes, newest first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one dispute with its timeline, economics and correspondence.
    Show {
        id: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Approve the drafted claim (AWAITING_USER_APPROVAL → WAITING_VENDOR_RESPONSE).
    Approve {
        id: String,
        #[arg(long)]
        note: Option<String>,
    },

    /// Reject the drafted claim (AWAITING_USER_APPROVAL → DISCARDED_BY_USER).
    Reject {
        id: String,
        /// Reason recorded with the decision.
        #[arg(long)]
        note: Option<String>,
    },

    /// Simulate a vendor reply to a submitted claim.
    Reply {
        id: String,
        #[arg(value_enum)]
        result: ReplyArg,
    },

    /// Ask the REST API to scan the inbox for new disputes.
    Scan,

    /// Portfolio summary over the current listing.
    Summary,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReplyArg {
    Accepted,
    Rejected,
    #[value(name = "needs_info", alias = "needs-info")]
    NeedsInfo,
}

impl From<ReplyArg> for VendorReply {
    fn from(arg: ReplyArg) -> Self {
        match arg {
            ReplyArg::Accepted => VendorReply::Accepted,
            ReplyArg::Rejected => VendorReply::Rejected,
            ReplyArg::NeedsInfo => VendorReply::NeedsInfo,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let mut config = BackendConfig::from_env().context("invalid backend configuration")?;
    config.sample_fallback |= cli.sample_fallback;
    let service = ClaimsService::from_config(&config)
        .context("failed to initialise backends")?
        .with_channel("cli");
    tracing::debug!(providers = ?service.provider_names(), "claims service ready");

    match cli.command {
        Commands::List { json } => {
            let disputes = service.list_disputes().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&disputes)?);
            } else {
                print!("{}", render::dispute_table(&disputes));
            }
            Ok(0)
        }
        Commands::Show { id, json } => {
            let dispute = service.get_dispute(&DisputeId::new(id)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dispute)?);
            } else {
                print!("{}", render::dispute_detail(&dispute));
            }
            Ok(0)
        }
        Commands::Approve { id, note } => {
            let outcome = service
                .decide(&DisputeId::new(id), Decision::Approve, note.as_deref())
                .await?;
            Ok(report(&outcome))
        }
        Commands::Reject { id, note } => {
            let outcome = service
                .decide(&DisputeId::new(id), Decision::Reject, note.as_deref())
                .await?;
            Ok(report(&outcome))
        }
        Commands::Reply { id, result } => {
            let outcome = service
                .simulate_vendor_reply(&DisputeId::new(id), result.into())
                .await?;
            Ok(report(&outcome))
        }
        Commands::Scan => {
            let resp = service.scan().await?;
            match resp.disputes_found {
                Some(n) => println!("scan {}: {n} dispute(s) found", resp.status),
                None => println!("scan {}", resp.status),
            }
            Ok(0)
        }
        Commands::Summary => {
            let summary = service.summary().await?;
            print!("{}", render::summary(&summary));
            Ok(0)
        }
    }
}

fn report(outcome: &Outcome) -> u8 {
    print!("{}", render::outcome(outcome));
    if outcome.is_applied() {
        0
    } else {
        EXIT_UNCHANGED
    }
}
