//! Command implementations. Results go to stdout; diagnostics go through
//! `tracing` to stderr.

use std::{
  io::{self, Read},
  path::PathBuf,
};

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde_json::json;
use tierteam_core::{
  assemble::{TeamRequest, assemble_team},
  purge::{plan_purge, purge_ids},
  resolver::multi_tier,
  showdown::{format_team, parse_team},
  store::BuildStore,
  tier::Tier,
};
use tierteam_paste::{PasteClient, PasteRequest};
use tierteam_store_sqlite::SqliteStore;
use tracing::{info, warn};

use crate::settings::Settings;

fn join_tiers(tiers: &[Tier]) -> String {
  tiers.iter().map(Tier::as_str).collect::<Vec<_>>().join(", ")
}

// ─── tiers ────────────────────────────────────────────────────────────────────

pub async fn tiers(store: &SqliteStore, settings: &Settings) -> Result<()> {
  let mut tiers = store.list_tiers().await.context("failed to list tiers")?;
  if tiers.is_empty() {
    warn!("catalog has no builds");
    return Ok(());
  }
  settings.ordering().sort_tiers(&mut tiers);
  for tier in tiers {
    println!("{tier}");
  }
  Ok(())
}

// ─── duplicates ───────────────────────────────────────────────────────────────

pub async fn duplicates(
  store: &SqliteStore,
  settings: &Settings,
  tier: Option<String>,
) -> Result<()> {
  let plan = plan_purge(store, &settings.ordering())
    .await
    .context("failed to resolve native tiers")?;

  if let Some(tier) = tier.map(Tier::from) {
    let recorded: Vec<_> = plan
      .resolutions
      .iter()
      .filter(|r| r.tiers.contains(&tier))
      .collect();
    println!("Species recorded in {tier}: {}", recorded.len());
    for r in recorded {
      println!(
        "{}: tiers [{}], native {}, native to {tier}: {}",
        r.species,
        join_tiers(&r.tiers),
        r.native_tier,
        if r.is_native_to(&tier) { "yes" } else { "no" },
      );
    }
    return Ok(());
  }

  let dupes = multi_tier(&plan.resolutions);
  println!("Total species: {}", plan.resolutions.len());
  println!("Species with multiple tiers: {}", dupes.len());
  for r in dupes {
    println!(
      "{}: [{}] -> native {} ({} redundant build(s))",
      r.species,
      join_tiers(&r.tiers),
      r.native_tier,
      r.redundant.len(),
    );
  }
  Ok(())
}

// ─── purge ────────────────────────────────────────────────────────────────────

pub async fn purge(
  store: &SqliteStore,
  settings: &Settings,
  dry_run: bool,
  chunk_size: usize,
) -> Result<()> {
  let plan = plan_purge(store, &settings.ordering())
    .await
    .context("failed to resolve native tiers")?;
  info!(redundant = plan.redundant.len(), "found builds outside their native tier");

  if dry_run {
    for r in plan.resolutions.iter().filter(|r| !r.redundant.is_empty()) {
      println!(
        "{}: keep {}, delete {} build(s)",
        r.species,
        r.native_tier,
        r.redundant.len(),
      );
    }
    println!("Would delete {} build(s).", plan.redundant.len());
    return Ok(());
  }

  let report = purge_ids(store, &plan.redundant, chunk_size)
    .await
    .context("purge aborted; re-run to resume from the current catalog")?;
  println!(
    "Deleted {} build(s) in {} chunk(s).",
    report.deleted, report.chunks
  );

  let orphans = store
    .orphaned_components()
    .await
    .context("failed to check for orphaned components")?;
  if orphans > 0 {
    warn!(orphans, "component rows reference builds that no longer exist");
  }
  Ok(())
}

// ─── team ─────────────────────────────────────────────────────────────────────

pub struct TeamOptions {
  pub tier:          String,
  pub include_lower: bool,
  pub size:          usize,
  pub seed:          Option<u64>,
  pub json:          bool,
  pub upload:        bool,
}

pub async fn team(
  store: &SqliteStore,
  settings: &Settings,
  options: TeamOptions,
) -> Result<()> {
  let request = TeamRequest::new(options.tier.as_str())
    .include_lower_tiers(options.include_lower)
    .size(options.size)
    .excluded(settings.excluded());

  let mut rng = match options.seed {
    Some(seed) => ChaCha20Rng::seed_from_u64(seed),
    None => ChaCha20Rng::from_entropy(),
  };

  let team = assemble_team(store, &settings.ordering(), &request, &mut rng)
    .await
    .with_context(|| format!("failed to assemble a {} team", options.tier))?;
  if team.len() < request.size {
    warn!(requested = request.size, assembled = team.len(), "team is smaller than requested");
  }

  let text = format_team(team.sets());

  let paste_url = if options.upload {
    let mut paste =
      PasteRequest::for_tier(text.as_str(), &options.tier, &settings.paste.author);
    paste.public = settings.paste.public;
    let client = PasteClient::new(settings.paste.base_url.as_str())?;
    Some(client.upload(&paste).await.context("failed to upload team")?)
  } else {
    None
  };

  if options.json {
    let out = json!({
      "tier":          options.tier,
      "allowed_tiers": team.allowed_tiers,
      "members":       team.members,
      "text":          text,
      "paste_url":     paste_url,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
  } else {
    println!("{text}");
    if let Some(url) = paste_url {
      println!("\n{url}");
    }
  }
  Ok(())
}

// ─── upload ───────────────────────────────────────────────────────────────────

pub struct UploadOptions {
  pub file:   Option<PathBuf>,
  pub title:  String,
  pub author: String,
  pub notes:  String,
  pub public: bool,
}

pub async fn upload(settings: &Settings, options: UploadOptions) -> Result<()> {
  let raw = match &options.file {
    Some(path) => std::fs::read_to_string(path)
      .with_context(|| format!("reading team file {}", path.display()))?,
    None => {
      let mut buf = String::new();
      io::stdin()
        .read_to_string(&mut buf)
        .context("reading team from stdin")?;
      buf
    }
  };

  let text = raw.trim();
  if text.is_empty() {
    bail!("no team text provided");
  }
  info!(members = parse_team(text).len(), "uploading team");

  let client = PasteClient::new(settings.paste.base_url.as_str())?;
  let request = PasteRequest {
    text:   text.to_owned(),
    title:  options.title,
    author: options.author,
    notes:  options.notes,
    public: options.public,
  };
  let url = client
    .upload(&request)
    .await
    .context("error creating paste")?;
  println!("{url}");
  Ok(())
}
