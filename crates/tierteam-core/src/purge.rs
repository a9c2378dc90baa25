//! Duplicate purge: permanently remove builds outside each species' native
//! tier.
//!
//! Deletion runs in bounded chunks. Each chunk is handed to
//! [`BuildStore::delete_builds`] as one atomic unit, so an interrupted purge
//! leaves every committed chunk fully applied and every other chunk
//! untouched. Resuming requires re-deriving the plan against current data.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
  build::BuildId,
  error::{Error, Result},
  resolver::{Resolution, resolve_catalog},
  store::BuildStore,
  tier::TierOrdering,
};

/// Builds deleted per transaction unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// What a purge would do against the current catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PurgePlan {
  pub resolutions: Vec<Resolution>,
  /// Every redundant build id across all species, ascending.
  pub redundant:   Vec<BuildId>,
}

/// Outcome of a completed purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
  pub redundant: usize,
  pub deleted:   usize,
  pub chunks:    usize,
  /// Whether the post-purge compaction succeeded. `false` when it failed or
  /// nothing was deleted.
  pub compacted: bool,
}

/// Resolve every species in the store without mutating anything.
pub async fn plan_purge<S: BuildStore>(
  store: &S,
  ordering: &TierOrdering,
) -> Result<PurgePlan> {
  let records = store.list_builds().await.map_err(Error::store)?;
  let resolutions = resolve_catalog(ordering, &records);

  let mut redundant: Vec<BuildId> = resolutions
    .iter()
    .flat_map(|r| r.redundant.iter().copied())
    .collect();
  redundant.sort_unstable();

  debug!(
    builds = records.len(),
    species = resolutions.len(),
    redundant = redundant.len(),
    "planned purge"
  );
  Ok(PurgePlan { resolutions, redundant })
}

/// Delete `ids` in chunks of `chunk_size`, then try to compact the store.
///
/// A failing chunk aborts the purge with [`Error::PurgeFailed`] carrying the
/// number of chunks already committed. A failing compaction is only logged.
pub async fn purge_ids<S: BuildStore>(
  store: &S,
  ids: &[BuildId],
  chunk_size: usize,
) -> Result<PurgeReport> {
  if chunk_size == 0 {
    return Err(Error::InvalidChunkSize);
  }

  let mut report = PurgeReport { redundant: ids.len(), ..Default::default() };
  if ids.is_empty() {
    info!("no redundant builds to delete");
    return Ok(report);
  }

  for chunk in ids.chunks(chunk_size) {
    match store.delete_builds(chunk).await {
      Ok(n) => {
        report.deleted += n;
        report.chunks += 1;
        debug!(chunk = report.chunks, deleted = n, "committed purge chunk");
      }
      Err(e) => {
        return Err(Error::PurgeFailed {
          committed_chunks: report.chunks,
          deleted:          report.deleted,
          source:           Box::new(e),
        });
      }
    }
  }

  report.compacted = match store.compact().await {
    Ok(()) => true,
    Err(e) => {
      warn!(error = %e, "compaction failed after purge");
      false
    }
  };

  info!(
    deleted = report.deleted,
    chunks = report.chunks,
    "purge complete"
  );
  Ok(report)
}

/// Plan and run a full purge.
pub async fn purge_duplicates<S: BuildStore>(
  store: &S,
  ordering: &TierOrdering,
  chunk_size: usize,
) -> Result<PurgeReport> {
  if chunk_size == 0 {
    return Err(Error::InvalidChunkSize);
  }
  let plan = plan_purge(store, ordering).await?;
  purge_ids(store, &plan.redundant, chunk_size).await
}
