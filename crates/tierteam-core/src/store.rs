//! The `BuildStore` trait.
//!
//! Implemented by storage backends (`tierteam-store-sqlite`, and
//! [`crate::memory::MemoryStore`] for tests). The resolver, purger and
//! assembler only ever talk to a store through this abstraction.

use std::future::Future;

use crate::{
  build::{BuildComponents, BuildId, BuildRecord},
  tier::Tier,
};

/// Narrow read/delete interface over the build catalog.
///
/// The catalog is written by an external ingestion step; the only mutation
/// exposed here is deletion.
pub trait BuildStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every build's (id, species, tier), ordered by id.
  fn list_builds(
    &self,
  ) -> impl Future<Output = Result<Vec<BuildRecord>, Self::Error>> + Send + '_;

  /// Distinct tiers with at least one build, in no particular order.
  fn list_tiers(
    &self,
  ) -> impl Future<Output = Result<Vec<Tier>, Self::Error>> + Send + '_;

  /// Distinct species with at least one build in any of `tiers`, ordered by
  /// name.
  fn species_in_tiers<'a>(
    &'a self,
    tiers: &'a [Tier],
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// The subset of `tiers` that `species` has builds in, ordered by name.
  fn tiers_for_species<'a>(
    &'a self,
    species: &'a str,
    tiers: &'a [Tier],
  ) -> impl Future<Output = Result<Vec<Tier>, Self::Error>> + Send + 'a;

  /// Ids of the builds recorded for `species` in `tier`, ordered by id.
  fn builds_for<'a>(
    &'a self,
    species: &'a str,
    tier: &'a Tier,
  ) -> impl Future<Output = Result<Vec<BuildId>, Self::Error>> + Send + 'a;

  /// All component options recorded for a build. EV rows keep their stored
  /// order. Unknown ids yield empty components.
  fn components(
    &self,
    id: BuildId,
  ) -> impl Future<Output = Result<BuildComponents, Self::Error>> + Send + '_;

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Delete the given builds and all of their component records as one
  /// atomic unit: components first, then the builds. Returns the number of
  /// build rows removed.
  fn delete_builds<'a>(
    &'a self,
    ids: &'a [BuildId],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Reclaim space freed by deletions.
  fn compact(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
