//! Runtime configuration.
//!
//! Layered, lowest precedence first: built-in defaults, the optional TOML
//! file, then `TIERTEAM_*` environment variables (`__` separates nesting, e.g.
//! `TIERTEAM_PURGE__CHUNK_SIZE=200`). Command-line flags override all three.

use std::{collections::BTreeSet, path::PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tierteam_core::{
  assemble::DEFAULT_TEAM_SIZE,
  purge::DEFAULT_CHUNK_SIZE,
  tier::{DEFAULT_EXCLUDED, DEFAULT_TIERS, Tier, TierOrdering},
};
use tierteam_paste::{DEFAULT_AUTHOR, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub database_path: PathBuf,
  pub tiers:         TierSettings,
  pub purge:         PurgeSettings,
  pub team:          TeamSettings,
  pub paste:         PasteSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierSettings {
  /// Most to least dominant.
  pub order:    Vec<String>,
  pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurgeSettings {
  pub chunk_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSettings {
  pub size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasteSettings {
  pub base_url: String,
  pub author:   String,
  pub public:   bool,
}

impl Settings {
  /// Load settings, treating a missing file as empty.
  pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
    Self::load_with(path, environment())
  }

  fn load_with(path: PathBuf, env: Environment) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("database_path", "pokemon_strategies.db")?
      .set_default("tiers.order", DEFAULT_TIERS.to_vec())?
      .set_default("tiers.excluded", DEFAULT_EXCLUDED.to_vec())?
      .set_default("purge.chunk_size", DEFAULT_CHUNK_SIZE as i64)?
      .set_default("team.size", DEFAULT_TEAM_SIZE as i64)?
      .set_default("paste.base_url", DEFAULT_BASE_URL)?
      .set_default("paste.author", DEFAULT_AUTHOR)?
      .set_default("paste.public", true)?
      .add_source(File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn ordering(&self) -> TierOrdering { TierOrdering::new(self.tiers.order.iter().cloned()) }

  pub fn excluded(&self) -> BTreeSet<Tier> {
    self.tiers.excluded.iter().cloned().map(Tier::from).collect()
  }
}

/// `TIERTEAM_` then the key path, sections joined by `__`.
fn environment() -> Environment {
  Environment::with_prefix("TIERTEAM")
    .prefix_separator("_")
    .separator("__")
}
