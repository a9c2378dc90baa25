//! Random team assembly.
//!
//! A team is drawn in three stages, each uniformly at random from a single
//! injected random source: distinct species from the allowed tiers, then one
//! eligible tier and one build per species, then one option per component of
//! that build.

use std::collections::BTreeSet;

use rand::{
  Rng,
  seq::{SliceRandom, index},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  build::{BuildComponents, BuildId, MoveSlot},
  error::{Error, Result},
  store::BuildStore,
  tier::{Tier, TierOrdering, default_excluded},
};

pub const DEFAULT_TEAM_SIZE: usize = 6;

// ─── Request ─────────────────────────────────────────────────────────────────

/// What kind of team to assemble.
#[derive(Debug, Clone)]
pub struct TeamRequest {
  pub tier:                Tier,
  /// Also draw from every tier below `tier`, minus `excluded`.
  pub include_lower_tiers: bool,
  pub size:                usize,
  /// Tiers that never contribute members when lower tiers are included.
  pub excluded:            BTreeSet<Tier>,
}

impl TeamRequest {
  /// A six-member request that includes lower tiers and excludes the default
  /// set.
  pub fn new(tier: impl Into<Tier>) -> Self {
    Self {
      tier:                tier.into(),
      include_lower_tiers: true,
      size:                DEFAULT_TEAM_SIZE,
      excluded:            default_excluded(),
    }
  }

  pub fn include_lower_tiers(mut self, include: bool) -> Self {
    self.include_lower_tiers = include;
    self
  }

  pub fn size(mut self, size: usize) -> Self {
    self.size = size;
    self
  }

  pub fn excluded(mut self, excluded: BTreeSet<Tier>) -> Self {
    self.excluded = excluded;
    self
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// One fully specified set, as rendered in Showdown notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
  pub name:      String,
  pub item:      Option<String>,
  pub ability:   Option<String>,
  pub tera_type: Option<String>,
  /// Every recorded EV row joined with `" / "`, e.g. `"252 Atk / 4 SpD"`.
  pub evs:       Option<String>,
  pub nature:    Option<String>,
  pub moves:     Vec<String>,
}

/// A team member together with where it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledMember {
  pub tier:   Tier,
  pub build:  BuildId,
  pub member: TeamMember,
}

#[derive(Debug, Clone, Serialize)]
pub struct Team {
  pub allowed_tiers: Vec<Tier>,
  /// In selection order. May be shorter than requested.
  pub members:       Vec<AssembledMember>,
}

impl Team {
  pub fn sets(&self) -> impl Iterator<Item = &TeamMember> {
    self.members.iter().map(|m| &m.member)
  }

  pub fn len(&self) -> usize { self.members.len() }

  pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

// ─── Expansion ───────────────────────────────────────────────────────────────

/// Pick one option per component of a build.
///
/// Item, ability, nature and tera type are drawn independently; each move
/// slot with recorded options yields one move, empty slots are skipped. EV
/// rows are not drawn: all of them are joined in stored order.
pub fn expand_build<R: Rng + ?Sized>(
  name: &str,
  components: &BuildComponents,
  rng: &mut R,
) -> TeamMember {
  let evs = (!components.evs.is_empty()).then(|| components.evs.join(" / "));

  let moves = MoveSlot::ALL
    .iter()
    .filter_map(|slot| components.moves_in(*slot).choose(rng).map(|m| (*m).to_owned()))
    .collect();

  TeamMember {
    name: name.to_owned(),
    item: components.items.choose(rng).cloned(),
    ability: components.abilities.choose(rng).cloned(),
    tera_type: components.tera_types.choose(rng).cloned(),
    evs,
    nature: components.natures.choose(rng).cloned(),
    moves,
  }
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Assemble a random team for `request`.
///
/// Fails with [`Error::NoCandidates`] when no species has a build in any
/// allowed tier. A chosen species that turns out to have no usable build is
/// skipped with a warning, so the team can come back smaller than requested.
pub async fn assemble_team<S, R>(
  store: &S,
  ordering: &TierOrdering,
  request: &TeamRequest,
  rng: &mut R,
) -> Result<Team>
where
  S: BuildStore,
  R: Rng + ?Sized,
{
  let allowed = ordering.allowed_tiers(
    &request.tier,
    request.include_lower_tiers,
    &request.excluded,
  );

  let candidates = store
    .species_in_tiers(&allowed)
    .await
    .map_err(Error::store)?;
  if candidates.is_empty() {
    return Err(Error::NoCandidates { tiers: allowed });
  }

  let chosen: Vec<&String> = if candidates.len() <= request.size {
    let mut all: Vec<&String> = candidates.iter().collect();
    all.shuffle(rng);
    all
  } else {
    index::sample(rng, candidates.len(), request.size)
      .into_iter()
      .map(|i| &candidates[i])
      .collect()
  };
  debug!(
    candidates = candidates.len(),
    chosen = chosen.len(),
    tier = %request.tier,
    "selected species"
  );

  let mut members = Vec::with_capacity(chosen.len());
  for species in chosen {
    let tiers = store
      .tiers_for_species(species, &allowed)
      .await
      .map_err(Error::store)?;
    let Some(tier) = tiers.choose(rng).cloned() else {
      warn!(%species, "no builds in any allowed tier; skipping");
      continue;
    };

    let builds = store
      .builds_for(species, &tier)
      .await
      .map_err(Error::store)?;
    let Some(build) = builds.choose(rng).copied() else {
      warn!(%species, %tier, "no builds in chosen tier; skipping");
      continue;
    };

    let components = store.components(build).await.map_err(Error::store)?;
    let member = expand_build(species, &components, rng);
    debug!(%species, %tier, %build, "expanded build");
    members.push(AssembledMember { tier, build, member });
  }

  Ok(Team { allowed_tiers: allowed, members })
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::SeedableRng;
  use rand_chacha::ChaCha20Rng;

  use super::*;
  use crate::{
    build::{BuildRecord, MoveOption, NewBuild},
    memory::{MemoryStore, MemoryStoreError},
  };

  fn rng() -> ChaCha20Rng { ChaCha20Rng::seed_from_u64(42) }

  fn full_components() -> BuildComponents {
    BuildComponents {
      items:      vec!["Leftovers".into(), "Rocky Helmet".into()],
      abilities:  vec!["Intimidate".into()],
      natures:    vec!["Impish".into()],
      evs:        vec!["252 HP".into(), "4 Atk".into(), "252 Def".into()],
      tera_types: vec!["Steel".into()],
      moves:      vec![
        MoveOption { slot: MoveSlot::Move1, name: "Earthquake".into() },
        MoveOption { slot: MoveSlot::Move2, name: "Stealth Rock".into() },
        MoveOption { slot: MoveSlot::Move2, name: "Spikes".into() },
        MoveOption { slot: MoveSlot::Move4, name: "Roar".into() },
      ],
    }
  }

  fn roster(store: &MemoryStore, tier: &str, names: &[&str]) {
    for name in names {
      store.insert_build(NewBuild::new(*name, tier).with_components(full_components()));
    }
  }

  #[test]
  fn expansion_draws_every_recorded_option() {
    let components = full_components();
    let mut rng = rng();
    let mut items = HashSet::new();
    for _ in 0..1000 {
      let m = expand_build("Landorus-Therian", &components, &mut rng);
      items.insert(m.item.clone().unwrap());
      assert_eq!(m.ability.as_deref(), Some("Intimidate"));
    }
    assert!(items.contains("Leftovers"));
    assert!(items.contains("Rocky Helmet"));
  }

  #[test]
  fn expansion_joins_evs_and_skips_empty_slots() {
    let m = expand_build("Hippowdon", &full_components(), &mut rng());
    assert_eq!(m.evs.as_deref(), Some("252 HP / 4 Atk / 252 Def"));
    assert_eq!(m.moves.len(), 3);
    assert_eq!(m.moves[0], "Earthquake");
    assert!(m.moves[1] == "Stealth Rock" || m.moves[1] == "Spikes");
    assert_eq!(m.moves[2], "Roar");
  }

  #[test]
  fn expansion_of_bare_build_is_name_only() {
    let m = expand_build("Ditto", &BuildComponents::default(), &mut rng());
    assert_eq!(m, TeamMember { name: "Ditto".into(), ..Default::default() });
  }

  #[tokio::test]
  async fn strict_request_only_uses_target_tier() {
    let store = MemoryStore::new();
    roster(&store, "RU", &["Mimikyu", "Slowbro", "Tentacruel"]);
    roster(&store, "NU", &["Tauros", "Lapras", "Copperajah", "Gothitelle"]);

    let request = TeamRequest::new("RU").include_lower_tiers(false);
    let team = assemble_team(&store, &TierOrdering::default(), &request, &mut rng())
      .await
      .unwrap();

    assert!(team.len() <= 6);
    assert_eq!(team.len(), 3);
    assert_eq!(team.allowed_tiers, vec![Tier::from("RU")]);
    for m in &team.members {
      assert_eq!(m.tier, Tier::from("RU"));
      assert!(["Mimikyu", "Slowbro", "Tentacruel"].contains(&m.member.name.as_str()));
    }
  }

  #[tokio::test]
  async fn lower_tiers_respect_bound_and_exclusions() {
    let store = MemoryStore::new();
    roster(&store, "OU", &["Garchomp", "Great Tusk"]);
    roster(&store, "UU", &["Latias", "Weavile"]);
    roster(&store, "ZU", &["Revavroom"]);
    roster(&store, "Uber", &["Koraidon"]);
    roster(&store, "LC", &["Pichu", "Gible", "Mudbray"]);
    roster(&store, "NFE", &["Dusclops"]);

    let request = TeamRequest::new("OU");
    let ordering = TierOrdering::default();
    for seed in 0..20 {
      let mut rng = ChaCha20Rng::seed_from_u64(seed);
      let team = assemble_team(&store, &ordering, &request, &mut rng).await.unwrap();
      assert_eq!(team.len(), 5);
      for m in &team.members {
        assert!(team.allowed_tiers.contains(&m.tier));
        assert!(!["LC", "NFE", "Uber"].contains(&m.tier.as_str()));
      }
    }
  }

  #[tokio::test]
  async fn members_are_distinct_species() {
    let store = MemoryStore::new();
    let names: Vec<String> = (0..30).map(|i| format!("Mon{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    roster(&store, "UU", &refs);
    roster(&store, "RU", &refs[..10]);

    let ordering = TierOrdering::default();
    for seed in 0..20 {
      let mut rng = ChaCha20Rng::seed_from_u64(seed);
      let team = assemble_team(&store, &ordering, &TeamRequest::new("UU"), &mut rng)
        .await
        .unwrap();
      assert_eq!(team.len(), 6);
      let unique: HashSet<_> = team.sets().map(|m| m.name.clone()).collect();
      assert_eq!(unique.len(), 6);
    }
  }

  #[tokio::test]
  async fn same_seed_gives_same_team() {
    let store = MemoryStore::new();
    let names: Vec<String> = (0..12).map(|i| format!("Mon{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    roster(&store, "OU", &refs);

    let ordering = TierOrdering::default();
    let request = TeamRequest::new("OU");
    let a = assemble_team(&store, &ordering, &request, &mut rng()).await.unwrap();
    let b = assemble_team(&store, &ordering, &request, &mut rng()).await.unwrap();
    assert_eq!(a.members, b.members);
  }

  #[tokio::test]
  async fn empty_candidate_set_is_an_error() {
    let store = MemoryStore::new();
    roster(&store, "NU", &["Tauros"]);

    let request = TeamRequest::new("OU").include_lower_tiers(false);
    let err = assemble_team(&store, &TierOrdering::default(), &request, &mut rng())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NoCandidates { ref tiers } if tiers == &[Tier::from("OU")]));
  }

  /// Reports a species as a candidate but never hands out its builds.
  struct Vanishing {
    inner: MemoryStore,
    gone:  &'static str,
  }

  impl BuildStore for Vanishing {
    type Error = MemoryStoreError;

    async fn list_builds(&self) -> Result<Vec<BuildRecord>, MemoryStoreError> {
      self.inner.list_builds().await
    }

    async fn list_tiers(&self) -> Result<Vec<Tier>, MemoryStoreError> {
      self.inner.list_tiers().await
    }

    async fn species_in_tiers(&self, tiers: &[Tier]) -> Result<Vec<String>, MemoryStoreError> {
      self.inner.species_in_tiers(tiers).await
    }

    async fn tiers_for_species(
      &self,
      species: &str,
      tiers: &[Tier],
    ) -> Result<Vec<Tier>, MemoryStoreError> {
      self.inner.tiers_for_species(species, tiers).await
    }

    async fn builds_for(
      &self,
      species: &str,
      tier: &Tier,
    ) -> Result<Vec<BuildId>, MemoryStoreError> {
      if species == self.gone {
        return Ok(Vec::new());
      }
      self.inner.builds_for(species, tier).await
    }

    async fn components(&self, id: BuildId) -> Result<BuildComponents, MemoryStoreError> {
      self.inner.components(id).await
    }

    async fn delete_builds(&self, ids: &[BuildId]) -> Result<usize, MemoryStoreError> {
      self.inner.delete_builds(ids).await
    }

    async fn compact(&self) -> Result<(), MemoryStoreError> { self.inner.compact().await }
  }

  #[tokio::test]
  async fn small_pool_is_returned_in_random_order() {
    let store = MemoryStore::new();
    roster(&store, "RU", &["Mimikyu", "Slowbro", "Tentacruel"]);
    let request = TeamRequest::new("RU").include_lower_tiers(false);
    let ordering = TierOrdering::default();

    let mut leads = BTreeSet::new();
    for seed in 0..20 {
      let mut rng = ChaCha20Rng::seed_from_u64(seed);
      let team = assemble_team(&store, &ordering, &request, &mut rng).await.unwrap();
      assert_eq!(team.len(), 3);
      leads.insert(team.members[0].member.name.clone());
    }
    assert!(leads.len() > 1, "pool order never changed: {leads:?}");
  }

  #[tokio::test]
  async fn species_without_builds_is_skipped() {
    let inner = MemoryStore::new();
    roster(&inner, "OU", &["Garchomp", "Kingambit", "Gholdengo"]);
    let store = Vanishing { inner, gone: "Kingambit" };

    let team = assemble_team(&store, &TierOrdering::default(), &TeamRequest::new("OU"), &mut rng())
      .await
      .unwrap();
    assert_eq!(team.len(), 2);
    assert!(team.sets().all(|m| m.name != "Kingambit"));
  }
}
