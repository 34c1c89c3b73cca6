//! Atomo CLI - local cache maintenance, sync and plan checks.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the local database schema
//! atomo migrate
//!
//! # Pull everything an owner has from the backend
//! atomo sync --owner user_1
//!
//! # List the owner's cached services and plan usage
//! atomo services --owner user_1
//!
//! # Ask whether the owner may create another shop
//! atomo can-create --owner user_1 --service shop
//! ```
//!
//! # Environment Variables
//!
//! See `atomo_app::config`. `migrate` only needs `ATOMO_DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atomo_core::{ProfileId, ServiceType};

mod commands;

#[derive(Parser)]
#[command(name = "atomo")]
#[command(author, version, about = "Atomo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the embedded schema to the local database
    Migrate,
    /// Pull profile, plans, subscription and every service from the backend
    Sync {
        /// Owner (profile) id
        #[arg(short, long)]
        owner: String,
    },
    /// List the owner's cached services and plan usage
    Services {
        /// Owner (profile) id
        #[arg(short, long)]
        owner: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check the plan limits for creating one more service
    CanCreate {
        /// Owner (profile) id
        #[arg(short, long)]
        owner: String,

        /// Service type (`menu`, `portfolio`, `cv`, `shop`, `invitation`)
        #[arg(short, long)]
        service: ServiceType,
    },
}

/// Initialize Sentry when `SENTRY_DSN` is set. The guard must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = dotenvy::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atomo_app=info,atomo=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Sync { owner } => commands::sync::run(&ProfileId::new(owner)).await,
        Commands::Services { owner, json } => {
            commands::services::list(&ProfileId::new(owner), json).await
        }
        Commands::CanCreate { owner, service } => {
            commands::services::can_create(&ProfileId::new(owner), service).await
        }
    }
}
