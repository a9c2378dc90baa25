//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tierteam_core::{
  assemble::{TeamRequest, assemble_team},
  build::{BuildComponents, BuildId, MoveOption, MoveSlot, NewBuild},
  purge::{DEFAULT_CHUNK_SIZE, plan_purge, purge_duplicates},
  showdown::{format_team, parse_team},
  store::BuildStore,
  tier::{Tier, TierOrdering},
};

use crate::{SqliteStore, encode::RawMove};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t(s: &str) -> Tier { Tier::from(s) }

fn mv(slot: MoveSlot, name: &str) -> MoveOption {
  MoveOption { slot, name: name.into() }
}

fn garchomp_set() -> BuildComponents {
  BuildComponents {
    items:      vec!["Rocky Helmet".into(), "Leftovers".into()],
    abilities:  vec!["Rough Skin".into()],
    natures:    vec!["Jolly".into(), "Impish".into()],
    evs:        vec!["252 HP".into(), "4 Atk".into(), "252 Def".into()],
    tera_types: vec!["Steel".into()],
    moves:      vec![
      mv(MoveSlot::Move1, "Earthquake"),
      mv(MoveSlot::Move2, "Stealth Rock"),
      mv(MoveSlot::Move3, "Dragon Tail"),
      mv(MoveSlot::Move3, "Spikes"),
      mv(MoveSlot::Move4, "Fire Blast"),
    ],
  }
}

async fn add(s: &SqliteStore, species: &str, tier: &str) -> BuildId {
  s.insert_build(NewBuild::new(species, tier).with_components(garchomp_set()))
    .await
    .unwrap()
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_list_builds() {
  let s = store().await;
  let a = add(&s, "Garchomp", "OU").await;
  let b = add(&s, "Garchomp", "UU").await;

  let builds = s.list_builds().await.unwrap();
  assert_eq!(builds.len(), 2);
  assert_eq!(builds[0].id, a);
  assert_eq!(builds[1].id, b);
  assert_eq!(builds[1].tier, t("UU"));
  assert_eq!(builds[0].species, "Garchomp");
}

#[tokio::test]
async fn components_roundtrip_in_stored_order() {
  let s = store().await;
  let id = add(&s, "Garchomp", "OU").await;

  let c = s.components(id).await.unwrap();
  assert_eq!(c, garchomp_set());
  assert_eq!(c.moves_in(MoveSlot::Move3), vec!["Dragon Tail", "Spikes"]);
}

#[tokio::test]
async fn unknown_build_has_empty_components() {
  let s = store().await;
  let c = s.components(BuildId(404)).await.unwrap();
  assert_eq!(c, BuildComponents::default());
}

#[test]
fn unknown_move_slot_is_dropped() {
  let bad = RawMove { move_slot: "Move5".into(), move_name: "Splash".into() };
  assert!(bad.into_option().is_none());

  let good = RawMove { move_slot: "Move2".into(), move_name: "Protect".into() };
  assert_eq!(good.into_option(), Some(mv(MoveSlot::Move2, "Protect")));
}

#[tokio::test]
async fn species_and_tier_queries() {
  let s = store().await;
  add(&s, "Latias", "UU").await;
  add(&s, "Garchomp", "OU").await;
  add(&s, "Garchomp", "UU").await;
  add(&s, "Garchomp", "UU").await;
  add(&s, "Mimikyu", "RU").await;

  let mut tiers = s.list_tiers().await.unwrap();
  TierOrdering::default().sort_tiers(&mut tiers);
  assert_eq!(tiers, vec![t("OU"), t("UU"), t("RU")]);

  let species = s.species_in_tiers(&[t("UU"), t("RU")]).await.unwrap();
  assert_eq!(species, vec!["Garchomp", "Latias", "Mimikyu"]);

  assert!(s.species_in_tiers(&[]).await.unwrap().is_empty());

  let garchomp = s
    .tiers_for_species("Garchomp", &[t("OU"), t("UU"), t("RU")])
    .await
    .unwrap();
  assert_eq!(garchomp, vec![t("OU"), t("UU")]);

  let builds = s.builds_for("Garchomp", &t("UU")).await.unwrap();
  assert_eq!(builds.len(), 2);
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_builds_removes_components_first() {
  let s = store().await;
  let a = add(&s, "Garchomp", "OU").await;
  let b = add(&s, "Garchomp", "UU").await;

  let n = s.delete_builds(&[a, BuildId(999)]).await.unwrap();
  assert_eq!(n, 1);
  assert_eq!(s.orphaned_components().await.unwrap(), 0);
  assert_eq!(s.components(a).await.unwrap(), BuildComponents::default());
  assert_eq!(s.components(b).await.unwrap(), garchomp_set());

  assert_eq!(s.delete_builds(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_delete_rolls_back_component_rows() {
  let s = store().await;
  let a = add(&s, "Garchomp", "OU").await;
  let b = add(&s, "Garchomp", "UU").await;

  // Component deletes succeed, then the build delete aborts.
  s.execute_batch(
    "CREATE TRIGGER refuse_build_delete BEFORE DELETE ON pokemon_builds
     BEGIN SELECT RAISE(ABORT, 'refused'); END;",
  )
  .await
  .unwrap();

  assert!(s.delete_builds(&[a, b]).await.is_err());

  s.execute_batch("DROP TRIGGER refuse_build_delete;")
    .await
    .unwrap();

  assert_eq!(s.list_builds().await.unwrap().len(), 2);
  assert_eq!(s.components(a).await.unwrap(), garchomp_set());
  assert_eq!(s.components(b).await.unwrap(), garchomp_set());
  assert_eq!(s.orphaned_components().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_purge_chunk_leaves_no_partial_deletes() {
  let s = store().await;
  let ou = add(&s, "Garchomp", "OU").await;
  let uu = add(&s, "Garchomp", "UU").await;
  let latias_ou = add(&s, "Latias", "OU").await;
  let latias_uu = add(&s, "Latias", "UU").await;

  // Let the first chunk through, refuse the second.
  s.execute_batch(format!(
    "CREATE TRIGGER refuse_second_chunk BEFORE DELETE ON pokemon_builds
     WHEN OLD.id = {}
     BEGIN SELECT RAISE(ABORT, 'refused'); END;",
    latias_ou.0
  ))
  .await
  .unwrap();

  let err = purge_duplicates(&s, &TierOrdering::default(), 1)
    .await
    .unwrap_err();
  match err {
    tierteam_core::Error::PurgeFailed { committed_chunks, deleted, .. } => {
      assert_eq!(committed_chunks, 1);
      assert_eq!(deleted, 1);
    }
    other => panic!("unexpected error: {other:?}"),
  }

  s.execute_batch("DROP TRIGGER refuse_second_chunk;")
    .await
    .unwrap();

  let left: BTreeSet<BuildId> =
    s.list_builds().await.unwrap().into_iter().map(|b| b.id).collect();
  assert_eq!(left, BTreeSet::from([uu, latias_ou, latias_uu]));
  assert!(!left.contains(&ou));
  assert_eq!(s.components(latias_ou).await.unwrap(), garchomp_set());
  assert_eq!(s.orphaned_components().await.unwrap(), 0);
}

#[tokio::test]
async fn compact_succeeds_after_delete() {
  let s = store().await;
  let a = add(&s, "Garchomp", "OU").await;
  s.delete_builds(&[a]).await.unwrap();
  s.compact().await.unwrap();
}

// ─── Purge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn purge_keeps_native_tier_only() {
  let s = store().await;
  let ou = add(&s, "Garchomp", "OU").await;
  let uu = add(&s, "Garchomp", "UU").await;
  for _ in 0..3 {
    add(&s, "Latias", "UU").await;
  }
  add(&s, "Moltres", "Uber").await;
  add(&s, "Moltres", "RU").await;
  add(&s, "Moltres", "RU").await;

  let ordering = TierOrdering::default();
  let plan = plan_purge(&s, &ordering).await.unwrap();
  assert_eq!(plan.redundant.len(), 2);
  assert!(plan.redundant.contains(&ou));
  let natives: BTreeMap<String, Tier> = plan
    .resolutions
    .iter()
    .map(|r| (r.species.clone(), r.native_tier.clone()))
    .collect();
  assert_eq!(natives["Garchomp"], t("UU"));

  let report = purge_duplicates(&s, &ordering, 1).await.unwrap();
  assert_eq!(report.deleted, 2);
  assert_eq!(report.chunks, 2);
  assert!(report.compacted);

  let mut remaining: BTreeMap<String, (usize, BTreeSet<Tier>)> = BTreeMap::new();
  for r in s.list_builds().await.unwrap() {
    let entry = remaining.entry(r.species).or_default();
    entry.0 += 1;
    entry.1.insert(r.tier);
  }
  for (species, (_, tiers)) in &remaining {
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers.iter().next(), Some(&natives[species]));
  }
  assert_eq!(remaining["Latias"].0, 3);
  assert_eq!(remaining["Moltres"].0, 2);
  assert_eq!(s.builds_for("Garchomp", &t("UU")).await.unwrap(), vec![uu]);
  assert_eq!(s.orphaned_components().await.unwrap(), 0);
}

#[tokio::test]
async fn purge_on_clean_catalog_deletes_nothing() {
  let s = store().await;
  add(&s, "Latias", "UU").await;
  add(&s, "Latias", "UU").await;

  let report = purge_duplicates(&s, &TierOrdering::default(), DEFAULT_CHUNK_SIZE)
    .await
    .unwrap();
  assert_eq!(report.deleted, 0);
  assert_eq!(s.list_builds().await.unwrap().len(), 2);
}

// ─── Assembly ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn strict_team_draws_only_from_target_tier() {
  let s = store().await;
  for name in ["Mimikyu", "Slowbro", "Tentacruel", "Hitmontop"] {
    add(&s, name, "RU").await;
  }
  for name in ["Tauros", "Lapras", "Copperajah"] {
    add(&s, name, "NU").await;
  }

  let request = TeamRequest::new("RU").include_lower_tiers(false);
  let mut rng = ChaCha20Rng::seed_from_u64(7);
  let team = assemble_team(&s, &TierOrdering::default(), &request, &mut rng)
    .await
    .unwrap();

  assert_eq!(team.len(), 4);
  assert!(team.members.iter().all(|m| m.tier == t("RU")));
  assert!(team.sets().all(|m| !["Tauros", "Lapras", "Copperajah"].contains(&m.name.as_str())));

  let text = format_team(team.sets());
  let parsed = parse_team(&text);
  assert_eq!(parsed.len(), 4);
  for member in &parsed {
    assert_eq!(member.ability.as_deref(), Some("Rough Skin"));
    assert_eq!(member.evs.as_deref(), Some("252 HP / 4 Atk / 252 Def"));
    assert_eq!(member.moves.len(), 4);
  }
}
