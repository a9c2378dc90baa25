//! Tier identifiers and the fixed competitive ordering between them.
//!
//! The ordering is a lookup table rather than a closed enum: the ruleset's
//! tier list grows over time, and identifiers it does not know about must
//! still flow through the system as *unranked* tiers.

use std::{
  collections::{BTreeSet, HashMap},
  fmt,
};

use serde::{Deserialize, Serialize};

/// Tiers from most to least dominant.
pub const DEFAULT_TIERS: [&str; 8] =
  ["AG", "Uber", "OU", "UU", "RU", "NU", "PU", "ZU"];

/// Tiers that never contribute members to a team built with lower-tier
/// inclusion ("not fully evolved" and "little cup").
pub const DEFAULT_EXCLUDED: [&str; 2] = ["NFE", "LC"];

// ─── Tier ────────────────────────────────────────────────────────────────────

/// A tier identifier as recorded in the store, e.g. `"OU"`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tier(String);

impl Tier {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Tier {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for Tier {
  fn from(s: String) -> Self { Self(s) }
}

/// The default exclusion set as owned tiers.
pub fn default_excluded() -> BTreeSet<Tier> {
  DEFAULT_EXCLUDED.iter().copied().map(Tier::from).collect()
}

// ─── TierOrdering ────────────────────────────────────────────────────────────

/// A total order over known tiers, most dominant first.
#[derive(Debug, Clone)]
pub struct TierOrdering {
  tiers: Vec<Tier>,
  index: HashMap<Tier, usize>,
}

impl Default for TierOrdering {
  fn default() -> Self { Self::new(DEFAULT_TIERS) }
}

impl TierOrdering {
  /// Build an ordering from a most-to-least dominant list. A repeated
  /// identifier keeps its first position.
  pub fn new<I, T>(tiers: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<Tier>,
  {
    let mut ordered = Vec::new();
    let mut index = HashMap::new();
    for tier in tiers.into_iter().map(Into::into) {
      if !index.contains_key(&tier) {
        index.insert(tier.clone(), ordered.len());
        ordered.push(tier);
      }
    }
    Self { tiers: ordered, index }
  }

  /// Zero-based position of `tier`, or `None` when the identifier is not part
  /// of the ordering. `None` is the unranked sentinel: it compares below every
  /// ranked position and is never displayed.
  pub fn rank(&self, tier: &Tier) -> Option<usize> {
    self.index.get(tier).copied()
  }

  pub fn contains(&self, tier: &Tier) -> bool { self.index.contains_key(tier) }

  pub fn len(&self) -> usize { self.tiers.len() }

  pub fn is_empty(&self) -> bool { self.tiers.is_empty() }

  pub fn tiers(&self) -> &[Tier] { &self.tiers }

  /// Sort for display: known tiers in ordering position, then unknown tiers
  /// alphabetically.
  pub fn sort_tiers(&self, tiers: &mut [Tier]) {
    tiers.sort_by(|a, b| {
      let ka = (self.rank(a).is_none(), self.rank(a));
      let kb = (self.rank(b).is_none(), self.rank(b));
      ka.cmp(&kb).then_with(|| a.cmp(b))
    });
  }

  /// The tiers a team for `target` may draw from.
  ///
  /// Without lower-tier inclusion this is exactly `{target}`. With it, every
  /// tier at or below the target's rank, minus `excluded`. A target the
  /// ordering does not know has no "below", so it stays on its own.
  pub fn allowed_tiers(
    &self,
    target: &Tier,
    include_lower: bool,
    excluded: &BTreeSet<Tier>,
  ) -> Vec<Tier> {
    match self.rank(target) {
      Some(start) if include_lower => self.tiers[start..]
        .iter()
        .filter(|t| !excluded.contains(*t))
        .cloned()
        .collect(),
      _ => vec![target.clone()],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn t(s: &str) -> Tier { Tier::from(s) }

  #[test]
  fn rank_follows_default_order() {
    let o = TierOrdering::default();
    assert_eq!(o.rank(&t("AG")), Some(0));
    assert_eq!(o.rank(&t("OU")), Some(2));
    assert_eq!(o.rank(&t("ZU")), Some(7));
    assert_eq!(o.len(), 8);
  }

  #[test]
  fn unknown_tier_is_unranked() {
    let o = TierOrdering::default();
    assert_eq!(o.rank(&t("LC")), None);
    assert_eq!(o.rank(&t("ou")), None);
  }

  #[test]
  fn repeated_identifier_keeps_first_position() {
    let o = TierOrdering::new(["OU", "UU", "OU", "RU"]);
    assert_eq!(o.len(), 3);
    assert_eq!(o.rank(&t("RU")), Some(2));
  }

  #[test]
  fn sort_puts_unknown_tiers_last_alphabetically() {
    let o = TierOrdering::default();
    let mut tiers = vec![t("NFE"), t("UU"), t("LC"), t("Uber"), t("OU")];
    o.sort_tiers(&mut tiers);
    assert_eq!(tiers, vec![t("Uber"), t("OU"), t("UU"), t("LC"), t("NFE")]);
  }

  #[test]
  fn allowed_tiers_strict_is_target_only() {
    let o = TierOrdering::default();
    let allowed = o.allowed_tiers(&t("RU"), false, &default_excluded());
    assert_eq!(allowed, vec![t("RU")]);
  }

  #[test]
  fn allowed_tiers_includes_everything_below() {
    let o = TierOrdering::new(["OU", "UU", "LC", "RU"]);
    let allowed = o.allowed_tiers(&t("UU"), true, &default_excluded());
    assert_eq!(allowed, vec![t("UU"), t("RU")]);
  }

  #[test]
  fn allowed_tiers_for_unknown_target_stays_single() {
    let o = TierOrdering::default();
    let allowed = o.allowed_tiers(&t("Monotype"), true, &default_excluded());
    assert_eq!(allowed, vec![t("Monotype")]);
  }
}
