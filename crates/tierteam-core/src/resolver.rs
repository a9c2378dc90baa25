//! Native-tier resolution.
//!
//! Overlapping source pages mean a species can be recorded under several
//! tiers. Its *native* tier is the least dominant of them; every build in any
//! other tier is redundant. Resolution is a pure function over already
//! fetched rows and is recomputed on demand, never stored.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
  build::{BuildId, BuildRecord},
  tier::{Tier, TierOrdering},
};

/// The verdict for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
  pub species:     String,
  pub native_tier: Tier,
  /// Every distinct tier the species was recorded under, display-sorted.
  pub tiers:       Vec<Tier>,
  /// Builds outside the native tier, ascending.
  pub redundant:   Vec<BuildId>,
}

impl Resolution {
  /// Whether the species was recorded under more than one tier.
  pub fn is_multi_tier(&self) -> bool { self.tiers.len() > 1 }

  pub fn is_native_to(&self, tier: &Tier) -> bool { &self.native_tier == tier }
}

/// Pick the least dominant tier among `tiers`.
///
/// Ranked tiers always beat unranked ones. When several candidates share the
/// best rank (only possible when all are unranked) the lexicographically
/// smallest identifier wins. Returns `None` for an empty input.
pub fn native_tier<'a, I>(ordering: &TierOrdering, tiers: I) -> Option<Tier>
where
  I: IntoIterator<Item = &'a Tier>,
{
  let distinct: BTreeSet<&Tier> = tiers.into_iter().collect();
  let mut best: Option<(&Tier, Option<usize>)> = None;
  for tier in distinct {
    let rank = ordering.rank(tier);
    match best {
      Some((_, best_rank)) if rank <= best_rank => {}
      _ => best = Some((tier, rank)),
    }
  }
  best.map(|(tier, _)| tier.clone())
}

/// Resolve one species from all of its `(build, tier)` rows.
///
/// Builds sharing the native tier are never redundant, however many there
/// are. Returns `None` when `entries` is empty.
pub fn resolve_species(
  ordering: &TierOrdering,
  species: &str,
  entries: &[(BuildId, Tier)],
) -> Option<Resolution> {
  let native = native_tier(ordering, entries.iter().map(|(_, t)| t))?;

  let mut tiers: Vec<Tier> = entries
    .iter()
    .map(|(_, t)| t.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();
  ordering.sort_tiers(&mut tiers);

  let mut redundant: Vec<BuildId> = entries
    .iter()
    .filter(|(_, t)| *t != native)
    .map(|(id, _)| *id)
    .collect();
  redundant.sort_unstable();
  redundant.dedup();

  Some(Resolution {
    species: species.to_owned(),
    native_tier: native,
    tiers,
    redundant,
  })
}

/// Group every build by species and resolve each, in species-name order.
pub fn resolve_catalog(
  ordering: &TierOrdering,
  records: &[BuildRecord],
) -> Vec<Resolution> {
  let mut by_species: BTreeMap<&str, Vec<(BuildId, Tier)>> = BTreeMap::new();
  for record in records {
    by_species
      .entry(record.species.as_str())
      .or_default()
      .push((record.id, record.tier.clone()));
  }

  by_species
    .into_iter()
    .filter_map(|(species, entries)| resolve_species(ordering, species, &entries))
    .collect()
}

/// Species recorded under more than one distinct tier.
pub fn multi_tier(resolutions: &[Resolution]) -> Vec<&Resolution> {
  resolutions.iter().filter(|r| r.is_multi_tier()).collect()
}
