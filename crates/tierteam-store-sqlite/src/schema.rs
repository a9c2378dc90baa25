//! SQL schema of the build catalog.
//!
//! The catalog is written by the scraper, so this layout is a contract this
//! crate consumes rather than owns. Running the DDL is idempotent and only
//! fills in tables that are missing, e.g. for a fresh or in-memory store.

/// Tables holding per-build component rows, each keyed by `build_id`.
pub const COMPONENT_TABLES: [&str; 6] = [
  "build_items",
  "build_abilities",
  "build_natures",
  "build_evs",
  "build_tera_types",
  "build_moves",
];

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pokemon_builds (
    id           INTEGER PRIMARY KEY,
    pokemon_name TEXT NOT NULL,
    tier         TEXT NOT NULL
);

-- Component rows reference pokemon_builds(id) without a declared foreign key;
-- the purge deletes them explicitly before their build.
CREATE TABLE IF NOT EXISTS build_items (
    build_id  INTEGER NOT NULL,
    item_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS build_abilities (
    build_id     INTEGER NOT NULL,
    ability_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS build_natures (
    build_id    INTEGER NOT NULL,
    nature_name TEXT NOT NULL
);

-- One row per stat, e.g. '252 Atk'; row id order is the display order.
CREATE TABLE IF NOT EXISTS build_evs (
    id        INTEGER PRIMARY KEY,
    build_id  INTEGER NOT NULL,
    ev_string TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS build_tera_types (
    build_id  INTEGER NOT NULL,
    tera_type TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS build_moves (
    build_id  INTEGER NOT NULL,
    move_slot TEXT NOT NULL,   -- 'Move1' .. 'Move4'
    move_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS pokemon_builds_species_tier_idx
    ON pokemon_builds(pokemon_name, tier);
CREATE INDEX IF NOT EXISTS build_items_build_idx      ON build_items(build_id);
CREATE INDEX IF NOT EXISTS build_abilities_build_idx  ON build_abilities(build_id);
CREATE INDEX IF NOT EXISTS build_natures_build_idx    ON build_natures(build_id);
CREATE INDEX IF NOT EXISTS build_evs_build_idx        ON build_evs(build_id);
CREATE INDEX IF NOT EXISTS build_tera_types_build_idx ON build_tera_types(build_id);
CREATE INDEX IF NOT EXISTS build_moves_build_idx      ON build_moves(build_id);
";
