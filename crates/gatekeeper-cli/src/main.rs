//! gatekeeper — operator CLI for the Gatekeeper access store.
//!
//! # Usage
//!
//! ```text
//! gatekeeper init-db
//! gatekeeper grant --plate 987-65-432 --name "Jane Smith" --added-by 123-45-678
//! gatekeeper guest 987-65-432
//! gatekeeper events 2025-01-15 --trespass
//! gatekeeper sweep --watch
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gatekeeper_core::GateConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "gatekeeper",
    about = "Gatekeeper — time-bound guest access for gated facilities",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to gatekeeper.toml (defaults apply when omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing collections, enable guest expiry, and seed sample residents.
    InitDb {
        /// Do not write the sample residents.
        #[arg(long)]
        skip_seed: bool,
    },
    /// Grant a guest vehicle access for 24 hours.
    Grant {
        /// Guest vehicle license plate.
        #[arg(long)]
        plate: String,
        /// Guest name.
        #[arg(long)]
        name: String,
        /// License plate of the authorizing resident.
        #[arg(long)]
        added_by: String,
    },
    /// Show a resident by license plate.
    Resident { plate: String },
    /// Show a guest grant and whether it is still active.
    Guest { plate: String },
    /// List one day's access events, oldest first.
    Events {
        /// Day to list, as YYYY-MM-DD.
        date: String,
        /// List trespass events instead of access events.
        #[arg(long)]
        trespass: bool,
    },
    /// Remove expired guest grants.
    Sweep {
        /// Keep sweeping on the configured interval until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatekeeper=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = GateConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::InitDb { skip_seed } => commands::init::init_db(&config, !skip_seed),
        Commands::Grant {
            plate,
            name,
            added_by,
        } => commands::grant::grant(&config, plate, name, added_by),
        Commands::Resident { plate } => commands::lookup::resident(&config, &plate),
        Commands::Guest { plate } => commands::lookup::guest(&config, &plate),
        Commands::Events { date, trespass } => commands::events::events(&config, &date, trespass),
        Commands::Sweep { watch } => commands::sweep::sweep(&config, watch).await,
    }
}
