//! Error types for `tierteam-core`.

use thiserror::Error;

use crate::tier::Tier;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// No species has a build in any allowed tier.
  #[error("no species found in tiers [{}]", join_tiers(.tiers))]
  NoCandidates { tiers: Vec<Tier> },

  #[error("purge chunk size must be at least 1")]
  InvalidChunkSize,

  /// A purge chunk failed to commit. Earlier chunks stay committed, so the
  /// redundant set must be re-derived before running again.
  #[error(
    "purge failed after {committed_chunks} committed chunk(s), {deleted} build(s) deleted: {source}"
  )]
  PurgeFailed {
    committed_chunks: usize,
    deleted:          usize,
    #[source]
    source:           BoxError,
  },

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

fn join_tiers(tiers: &[Tier]) -> String {
  tiers.iter().map(Tier::as_str).collect::<Vec<_>>().join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
