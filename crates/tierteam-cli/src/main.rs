//! `tierteam` — maintain a tiered build catalog and draw random teams from it.
//!
//! # Usage
//!
//! ```text
//! tierteam tiers
//! tierteam duplicates [--tier OU]
//! tierteam purge [--dry-run]
//! tierteam team OU [--no-lower] [--seed 42] [--json] [--upload]
//! tierteam upload --file team.txt --title "My Team"
//! ```

mod commands;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use settings::Settings;
use tierteam_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tierteam", author, version, about = "Tiered build catalog and random team generator")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tierteam.toml")]
  config: PathBuf,

  /// SQLite catalog to use instead of the configured `database_path`.
  #[arg(long, env = "TIERTEAM_DATABASE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List the tiers present in the catalog.
  Tiers,

  /// Report species recorded under more than one tier.
  Duplicates {
    /// Instead, list every species recorded in this tier and whether it is
    /// native to it.
    #[arg(long)]
    tier: Option<String>,
  },

  /// Delete every build outside its species' native tier.
  Purge {
    /// Show what would be deleted without touching the catalog.
    #[arg(long)]
    dry_run: bool,

    /// Builds deleted per transaction.
    #[arg(long)]
    chunk_size: Option<usize>,
  },

  /// Assemble a random team.
  Team {
    /// Target tier, e.g. OU.
    tier: String,

    /// Only draw from the target tier itself.
    #[arg(long)]
    no_lower: bool,

    /// Number of members to draw.
    #[arg(long)]
    size: Option<usize>,

    /// Seed for a reproducible team.
    #[arg(long)]
    seed: Option<u64>,

    /// Print structured JSON instead of Showdown text.
    #[arg(long)]
    json: bool,

    /// Publish the team and print the paste URL.
    #[arg(long)]
    upload: bool,
  },

  /// Upload existing Showdown team text.
  Upload {
    /// File with the team export; stdin when omitted.
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[arg(long, default_value = "My Showdown Team")]
    title: String,

    #[arg(long, default_value = "")]
    author: String,

    #[arg(long, default_value = "")]
    notes: String,

    /// Create an unlisted paste instead of a public one.
    #[arg(long)]
    unlisted: bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings =
    Settings::load(cli.config).context("failed to read configuration")?;
  if let Some(path) = cli.database {
    settings.database_path = path;
  }

  match cli.command {
    Command::Tiers => {
      let store = open_store(&settings).await?;
      commands::tiers(&store, &settings).await
    }
    Command::Duplicates { tier } => {
      let store = open_store(&settings).await?;
      commands::duplicates(&store, &settings, tier).await
    }
    Command::Purge { dry_run, chunk_size } => {
      let store = open_store(&settings).await?;
      let chunk_size = chunk_size.unwrap_or(settings.purge.chunk_size);
      commands::purge(&store, &settings, dry_run, chunk_size).await
    }
    Command::Team { tier, no_lower, size, seed, json, upload } => {
      let store = open_store(&settings).await?;
      let options = commands::TeamOptions {
        tier,
        include_lower: !no_lower,
        size: size.unwrap_or(settings.team.size),
        seed,
        json,
        upload,
      };
      commands::team(&store, &settings, options).await
    }
    Command::Upload { file, title, author, notes, unlisted } => {
      let request = commands::UploadOptions { file, title, author, notes, public: !unlisted };
      commands::upload(&settings, request).await
    }
  }
}

async fn open_store(settings: &Settings) -> Result<SqliteStore> {
  open_catalog(&settings.database_path).await
}

/// Open an existing catalog; a missing file is an error.
async fn open_catalog(path: &Path) -> Result<SqliteStore> {
  anyhow::ensure!(
    path.is_file(),
    "catalog not found at {path:?} (set `database_path` or pass --database)"
  );
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open catalog at {path:?}"))
}
