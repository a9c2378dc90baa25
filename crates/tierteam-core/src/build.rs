//! Builds — one recorded strategy for a species in a tier — and the
//! component options recorded for them.
//!
//! Each component collection lists alternatives the community considers
//! viable for that slot; any one of them is a valid pick, never a combination.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Row id of a build in the store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BuildId(pub i64);

impl fmt::Display for BuildId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A build's identity row: which species, in which tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
  pub id:      BuildId,
  pub species: String,
  pub tier:    Tier,
}

// ─── Moves ───────────────────────────────────────────────────────────────────

/// One of the four move slots of a set.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MoveSlot {
  Move1,
  Move2,
  Move3,
  Move4,
}

impl MoveSlot {
  pub const ALL: [MoveSlot; 4] =
    [Self::Move1, Self::Move2, Self::Move3, Self::Move4];

  /// The slot identifier stored in the `move_slot` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Move1 => "Move1",
      Self::Move2 => "Move2",
      Self::Move3 => "Move3",
      Self::Move4 => "Move4",
    }
  }
}

impl fmt::Display for MoveSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returned when a stored slot identifier is not `Move1`..`Move4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMoveSlot(pub String);

impl FromStr for MoveSlot {
  type Err = UnknownMoveSlot;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Move1" => Ok(Self::Move1),
      "Move2" => Ok(Self::Move2),
      "Move3" => Ok(Self::Move3),
      "Move4" => Ok(Self::Move4),
      other => Err(UnknownMoveSlot(other.to_owned())),
    }
  }
}

/// A recorded move option for a given slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOption {
  pub slot: MoveSlot,
  pub name: String,
}

// ─── Components ──────────────────────────────────────────────────────────────

/// Every component option recorded for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildComponents {
  pub items:      Vec<String>,
  pub abilities:  Vec<String>,
  pub natures:    Vec<String>,
  /// EV rows such as `"252 Atk"`, in stored order.
  pub evs:        Vec<String>,
  pub tera_types: Vec<String>,
  pub moves:      Vec<MoveOption>,
}

impl BuildComponents {
  /// Recorded options for one move slot, in stored order.
  pub fn moves_in(&self, slot: MoveSlot) -> Vec<&str> {
    self
      .moves
      .iter()
      .filter(|m| m.slot == slot)
      .map(|m| m.name.as_str())
      .collect()
  }
}

// ─── NewBuild ────────────────────────────────────────────────────────────────

/// Input for ingestion-side inserts. The core never creates builds; stores
/// expose this for fixtures and import tooling.
#[derive(Debug, Clone)]
pub struct NewBuild {
  pub species:    String,
  pub tier:       Tier,
  pub components: BuildComponents,
}

impl NewBuild {
  /// A build with no recorded components.
  pub fn new(species: impl Into<String>, tier: impl Into<Tier>) -> Self {
    Self {
      species:    species.into(),
      tier:       tier.into(),
      components: BuildComponents::default(),
    }
  }

  pub fn with_components(mut self, components: BuildComponents) -> Self {
    self.components = components;
    self
  }
}
