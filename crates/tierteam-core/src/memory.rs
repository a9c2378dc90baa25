//! [`MemoryStore`] — an in-memory [`BuildStore`] for tests and tooling that
//! has no database at hand.

use std::{
  collections::BTreeSet,
  sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::{
  build::{BuildComponents, BuildId, BuildRecord, NewBuild},
  store::BuildStore,
  tier::Tier,
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  /// Raised by a delete once the configured failure point is reached.
  #[error("injected delete failure")]
  InjectedFailure,

  #[error("injected compaction failure")]
  CompactionFailure,
}

#[derive(Debug, Default)]
struct Inner {
  next_id:      i64,
  builds:       Vec<(BuildRecord, BuildComponents)>,
  /// Successful delete calls remaining before deletes start failing.
  deletes_left: Option<usize>,
  compactions:  usize,
  fail_compact: bool,
}

/// A build catalog held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Record a build; ids are assigned sequentially from 1.
  pub fn insert_build(&self, build: NewBuild) -> BuildId {
    let mut inner = self.lock();
    inner.next_id += 1;
    let id = BuildId(inner.next_id);
    inner.builds.push((
      BuildRecord { id, species: build.species, tier: build.tier },
      build.components,
    ));
    id
  }

  /// Let `n` delete calls succeed, then fail every later one.
  pub fn fail_deletes_after(&self, n: usize) { self.lock().deletes_left = Some(n); }

  /// Make every later [`BuildStore::compact`] call fail.
  pub fn fail_compaction(&self) { self.lock().fail_compact = true; }

  /// How many times [`BuildStore::compact`] ran.
  pub fn compactions(&self) -> usize { self.lock().compactions }
}

impl BuildStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn list_builds(&self) -> Result<Vec<BuildRecord>, MemoryStoreError> {
    Ok(self.lock().builds.iter().map(|(r, _)| r.clone()).collect())
  }

  async fn list_tiers(&self) -> Result<Vec<Tier>, MemoryStoreError> {
    let tiers: BTreeSet<Tier> =
      self.lock().builds.iter().map(|(r, _)| r.tier.clone()).collect();
    Ok(tiers.into_iter().collect())
  }

  async fn species_in_tiers(
    &self,
    tiers: &[Tier],
  ) -> Result<Vec<String>, MemoryStoreError> {
    let species: BTreeSet<String> = self
      .lock()
      .builds
      .iter()
      .filter(|(r, _)| tiers.contains(&r.tier))
      .map(|(r, _)| r.species.clone())
      .collect();
    Ok(species.into_iter().collect())
  }

  async fn tiers_for_species(
    &self,
    species: &str,
    tiers: &[Tier],
  ) -> Result<Vec<Tier>, MemoryStoreError> {
    let found: BTreeSet<Tier> = self
      .lock()
      .builds
      .iter()
      .filter(|(r, _)| r.species == species && tiers.contains(&r.tier))
      .map(|(r, _)| r.tier.clone())
      .collect();
    Ok(found.into_iter().collect())
  }

  async fn builds_for(
    &self,
    species: &str,
    tier: &Tier,
  ) -> Result<Vec<BuildId>, MemoryStoreError> {
    Ok(
      self
        .lock()
        .builds
        .iter()
        .filter(|(r, _)| r.species == species && &r.tier == tier)
        .map(|(r, _)| r.id)
        .collect(),
    )
  }

  async fn components(
    &self,
    id: BuildId,
  ) -> Result<BuildComponents, MemoryStoreError> {
    Ok(
      self
        .lock()
        .builds
        .iter()
        .find(|(r, _)| r.id == id)
        .map(|(_, c)| c.clone())
        .unwrap_or_default(),
    )
  }

  async fn delete_builds(&self, ids: &[BuildId]) -> Result<usize, MemoryStoreError> {
    let mut inner = self.lock();
    if let Some(left) = inner.deletes_left.as_mut() {
      if *left == 0 {
        return Err(MemoryStoreError::InjectedFailure);
      }
      *left -= 1;
    }
    let before = inner.builds.len();
    inner.builds.retain(|(r, _)| !ids.contains(&r.id));
    Ok(before - inner.builds.len())
  }

  async fn compact(&self) -> Result<(), MemoryStoreError> {
    let mut inner = self.lock();
    if inner.fail_compact {
      return Err(MemoryStoreError::CompactionFailure);
    }
    inner.compactions += 1;
    Ok(())
  }
}
