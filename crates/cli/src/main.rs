//! Order Desk CLI - command-line client for the order reporting server.
//!
//! # Usage
//!
//! ```bash
//! # Check the server is up
//! orderdesk health
//!
//! # First page of paid orders
//! orderdesk orders --financial-status paid --limit 25
//!
//! # Download every order from January as CSV
//! orderdesk export --created-at-min 2024-01-01 --created-at-max 2024-01-31 -o january.csv
//!
//! # Start a background export and follow it until it finishes
//! orderdesk batch start --max-batches 10 --wait
//!
//! # Check on a background export later
//! orderdesk batch status 0191d3a4-6c7e-7f00-8a4b-2f1e9d0c5b11
//! ```
//!
//! The server address comes from `--server` or `ORDERDESK_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use orderdesk_server::export::StatusPoller;
use url::Url;

mod client;
mod commands;

use client::ApiClient;
use commands::{CommandError, FilterArgs};

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(author, version, about = "Order Desk reporting CLI")]
struct Cli {
    /// Base URL of the Order Desk server
    #[arg(
        long,
        global = true,
        env = "ORDERDESK_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    server: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,
    /// List orders as JSON
    Orders {
        /// Orders per page (1-250)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Cursor from a previous page's `endCursor`
        #[arg(long)]
        after: Option<String>,

        /// Fetch every page instead of one
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Download orders as CSV, one row per line item
    Export {
        /// Output file; defaults to the server-suggested name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export only the first page instead of every page
        #[arg(long)]
        first_page_only: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Background export jobs
    Batch {
        #[command(subcommand)]
        action: BatchAction,
    },
}

#[derive(Subcommand)]
enum BatchAction {
    /// Start a background export job
    Start {
        /// Orders per page
        #[arg(long)]
        batch_size: Option<u32>,

        /// Maximum number of pages to fetch
        #[arg(long)]
        max_batches: Option<u32>,

        /// Poll until the job finishes (Ctrl+C stops polling only)
        #[arg(long)]
        wait: bool,

        /// Seconds between status checks when waiting
        #[arg(long, default_value_t = 2)]
        interval: u64,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the current state of a job
    Status {
        /// Job id returned by `batch start`
        batch_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orderdesk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let client = ApiClient::new(cli.server);

    match cli.command {
        Commands::Health => commands::orders::health(&client).await,
        Commands::Orders {
            limit,
            after,
            all,
            filters,
        } => commands::orders::list(&client, filters, limit, after, all).await,
        Commands::Export {
            output,
            first_page_only,
            filters,
        } => commands::orders::export(&client, filters, output, first_page_only).await,
        Commands::Batch { action } => match action {
            BatchAction::Start {
                batch_size,
                max_batches,
                wait,
                interval,
                filters,
            } => {
                let poller = StatusPoller::new(Duration::from_secs(interval.max(1)));
                commands::batch::start(&client, filters, batch_size, max_batches, wait, poller)
                    .await
            }
            BatchAction::Status { batch_id } => commands::batch::status(&client, &batch_id).await,
        },
    }
}
