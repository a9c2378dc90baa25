//! [`SqliteStore`] — the SQLite implementation of [`BuildStore`].

use std::path::Path;

use rusqlite::params_from_iter;
use tierteam_core::{
  build::{BuildComponents, BuildId, BuildRecord, NewBuild},
  store::BuildStore,
  tier::Tier,
};
use tracing::debug;

use crate::{
  Error, Result,
  encode::{RawBuild, RawMove, encode_ids, encode_tiers, placeholders},
  schema::{COMPONENT_TABLES, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A build catalog backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a catalog at `path` and ensure the schema exists.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory catalog — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a build and all of its component rows in one transaction.
  ///
  /// Ingestion normally happens outside this crate; this exists for fixtures
  /// and import tooling.
  pub async fn insert_build(&self, build: NewBuild) -> Result<BuildId> {
    let NewBuild { species, tier, components } = build;
    let tier = tier.as_str().to_owned();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO pokemon_builds (pokemon_name, tier) VALUES (?1, ?2)",
          rusqlite::params![species, tier],
        )?;
        let id = tx.last_insert_rowid();

        for (sql, values) in [
          ("INSERT INTO build_items (build_id, item_name) VALUES (?1, ?2)", &components.items),
          ("INSERT INTO build_abilities (build_id, ability_name) VALUES (?1, ?2)", &components.abilities),
          ("INSERT INTO build_natures (build_id, nature_name) VALUES (?1, ?2)", &components.natures),
          ("INSERT INTO build_evs (build_id, ev_string) VALUES (?1, ?2)", &components.evs),
          ("INSERT INTO build_tera_types (build_id, tera_type) VALUES (?1, ?2)", &components.tera_types),
        ] {
          let mut stmt = tx.prepare(sql)?;
          for value in values {
            stmt.execute(rusqlite::params![id, value])?;
          }
        }

        {
          let mut stmt = tx.prepare(
            "INSERT INTO build_moves (build_id, move_slot, move_name) VALUES (?1, ?2, ?3)",
          )?;
          for m in &components.moves {
            stmt.execute(rusqlite::params![id, m.slot.as_str(), m.name])?;
          }
        }

        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(BuildId(id))
  }

  /// Component rows whose `build_id` no longer exists in `pokemon_builds`.
  pub async fn orphaned_components(&self) -> Result<usize> {
    let count = self
      .conn
      .call(|conn| {
        let mut total = 0usize;
        for table in COMPONENT_TABLES {
          let n: i64 = conn.query_row(
            &format!(
              "SELECT COUNT(*) FROM {table}
               WHERE build_id NOT IN (SELECT id FROM pokemon_builds)"
            ),
            [],
            |row| row.get(0),
          )?;
          total += n as usize;
        }
        Ok(total)
      })
      .await?;
    Ok(count)
  }

  /// Run raw SQL against the connection. Tests use this to install faults.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: impl Into<String>) -> Result<()> {
    let sql = sql.into();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Read one single-column component table for a build.
fn component_values(
  conn: &rusqlite::Connection,
  sql: &str,
  id: i64,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  let values = stmt
    .query_map(rusqlite::params![id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(values)
}

// ─── BuildStore impl ─────────────────────────────────────────────────────────

impl BuildStore for SqliteStore {
  type Error = Error;

  async fn list_builds(&self) -> Result<Vec<BuildRecord>> {
    let raws: Vec<RawBuild> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT id, pokemon_name, tier FROM pokemon_builds ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawBuild {
              id:           row.get(0)?,
              pokemon_name: row.get(1)?,
              tier:         row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawBuild::into_record).collect())
  }

  async fn list_tiers(&self) -> Result<Vec<Tier>> {
    let tiers: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT tier FROM pokemon_builds")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(tiers.into_iter().map(Tier::from).collect())
  }

  async fn species_in_tiers(&self, tiers: &[Tier]) -> Result<Vec<String>> {
    if tiers.is_empty() {
      return Ok(Vec::new());
    }
    let tiers = encode_tiers(tiers);

    let species = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT DISTINCT pokemon_name FROM pokemon_builds
           WHERE tier IN ({})
           ORDER BY pokemon_name",
          placeholders(tiers.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(tiers.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(species)
  }

  async fn tiers_for_species(&self, species: &str, tiers: &[Tier]) -> Result<Vec<Tier>> {
    if tiers.is_empty() {
      return Ok(Vec::new());
    }
    let species = species.to_owned();
    let tiers = encode_tiers(tiers);

    let found: Vec<String> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT DISTINCT tier FROM pokemon_builds
           WHERE pokemon_name = ? AND tier IN ({})
           ORDER BY tier",
          placeholders(tiers.len())
        );
        let params = std::iter::once(&species).chain(tiers.iter());
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(found.into_iter().map(Tier::from).collect())
  }

  async fn builds_for(&self, species: &str, tier: &Tier) -> Result<Vec<BuildId>> {
    let species = species.to_owned();
    let tier = tier.as_str().to_owned();

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id FROM pokemon_builds
           WHERE pokemon_name = ?1 AND tier = ?2
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![species, tier], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(BuildId).collect())
  }

  async fn components(&self, id: BuildId) -> Result<BuildComponents> {
    let id = id.0;

    let (items, abilities, natures, evs, tera_types, moves) = self
      .conn
      .call(move |conn| {
        let items = component_values(
          conn,
          "SELECT item_name FROM build_items WHERE build_id = ?1 ORDER BY rowid",
          id,
        )?;
        let abilities = component_values(
          conn,
          "SELECT ability_name FROM build_abilities WHERE build_id = ?1 ORDER BY rowid",
          id,
        )?;
        let natures = component_values(
          conn,
          "SELECT nature_name FROM build_natures WHERE build_id = ?1 ORDER BY rowid",
          id,
        )?;
        let evs = component_values(
          conn,
          "SELECT ev_string FROM build_evs WHERE build_id = ?1 ORDER BY id",
          id,
        )?;
        let tera_types = component_values(
          conn,
          "SELECT tera_type FROM build_tera_types WHERE build_id = ?1 ORDER BY rowid",
          id,
        )?;

        let mut stmt = conn.prepare(
          "SELECT move_slot, move_name FROM build_moves
           WHERE build_id = ?1 ORDER BY rowid",
        )?;
        let moves = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawMove { move_slot: row.get(0)?, move_name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((items, abilities, natures, evs, tera_types, moves))
      })
      .await?;

    Ok(BuildComponents {
      items,
      abilities,
      natures,
      evs,
      tera_types,
      moves: moves.into_iter().filter_map(RawMove::into_option).collect(),
    })
  }

  async fn delete_builds(&self, ids: &[BuildId]) -> Result<usize> {
    if ids.is_empty() {
      return Ok(0);
    }
    let ids = encode_ids(ids);
    let requested = ids.len();

    let deleted = self
      .conn
      .call(move |conn| {
        let list = placeholders(ids.len());
        let tx = conn.transaction()?;
        for table in COMPONENT_TABLES {
          tx.execute(
            &format!("DELETE FROM {table} WHERE build_id IN ({list})"),
            params_from_iter(ids.iter()),
          )?;
        }
        let n = tx.execute(
          &format!("DELETE FROM pokemon_builds WHERE id IN ({list})"),
          params_from_iter(ids.iter()),
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    debug!(requested, deleted, "deleted builds");
    Ok(deleted)
  }

  async fn compact(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("VACUUM")?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
