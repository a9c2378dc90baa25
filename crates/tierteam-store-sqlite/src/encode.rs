//! Conversions between catalog rows and `tierteam-core` types.

use tierteam_core::{
  build::{BuildId, BuildRecord, MoveOption, MoveSlot},
  tier::Tier,
};
use tracing::debug;

/// A `pokemon_builds` row as read from SQLite.
pub struct RawBuild {
  pub id:           i64,
  pub pokemon_name: String,
  pub tier:         String,
}

impl RawBuild {
  pub fn into_record(self) -> BuildRecord {
    BuildRecord {
      id:      BuildId(self.id),
      species: self.pokemon_name,
      tier:    Tier::from(self.tier),
    }
  }
}

/// A `build_moves` row as read from SQLite.
pub struct RawMove {
  pub move_slot: String,
  pub move_name: String,
}

impl RawMove {
  /// Rows with a slot outside `Move1`..`Move4` carry no usable position and
  /// are dropped.
  pub fn into_option(self) -> Option<MoveOption> {
    match self.move_slot.parse::<MoveSlot>() {
      Ok(slot) => Some(MoveOption { slot, name: self.move_name }),
      Err(_) => {
        debug!(slot = %self.move_slot, name = %self.move_name, "ignoring move with unknown slot");
        None
      }
    }
  }
}

/// `?, ?, ?` for an `IN (...)` list of `n` parameters.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

pub fn encode_tiers(tiers: &[Tier]) -> Vec<String> {
  tiers.iter().map(|t| t.as_str().to_owned()).collect()
}

pub fn encode_ids(ids: &[BuildId]) -> Vec<i64> { ids.iter().map(|id| id.0).collect() }
