//! Showdown "set" text notation.
//!
//! ```text
//! Garchomp @ Rocky Helmet
//! Ability: Rough Skin
//! Tera Type: Steel
//! EVs: 252 HP / 4 Atk / 252 Def
//! Nature: Impish
//! - Earthquake
//! - Stealth Rock
//! ```
//!
//! Sets are separated by one blank line. Downstream consumers split on blank
//! lines and read the remaining lines by their fixed prefixes, so the labels
//! below are part of the contract.

use crate::assemble::TeamMember;

const ABILITY: &str = "Ability: ";
const TERA: &str = "Tera Type: ";
const EVS: &str = "EVs: ";
const NATURE: &str = "Nature: ";
const MOVE: &str = "- ";

/// Render one set. Absent fields produce no line.
pub fn format_member(member: &TeamMember) -> String {
  let mut lines = Vec::with_capacity(5 + member.moves.len());

  lines.push(match &member.item {
    Some(item) => format!("{} @ {item}", member.name),
    None => member.name.clone(),
  });

  for (label, value) in [
    (ABILITY, &member.ability),
    (TERA, &member.tera_type),
    (EVS, &member.evs),
    (NATURE, &member.nature),
  ] {
    if let Some(v) = value {
      lines.push(format!("{label}{v}"));
    }
  }

  lines.extend(member.moves.iter().map(|m| format!("{MOVE}{m}")));
  lines.join("\n")
}

/// Render a team: one block per member, blank-line separated, in order.
pub fn format_team<'a, I>(members: I) -> String
where
  I: IntoIterator<Item = &'a TeamMember>,
{
  members
    .into_iter()
    .map(format_member)
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Read team text back into sets.
///
/// Accepts `\n` or `\r\n` line endings and any number of blank lines between
/// blocks. Lines without a known prefix are ignored.
pub fn parse_team(text: &str) -> Vec<TeamMember> {
  let mut team = Vec::new();
  let mut block: Vec<&str> = Vec::new();

  for line in text.lines().map(str::trim) {
    if line.is_empty() {
      if !block.is_empty() {
        team.push(parse_block(&block));
        block.clear();
      }
    } else {
      block.push(line);
    }
  }
  if !block.is_empty() {
    team.push(parse_block(&block));
  }
  team
}

fn parse_block(lines: &[&str]) -> TeamMember {
  let mut member = TeamMember::default();
  let Some((first, rest)) = lines.split_first() else {
    return member;
  };

  match first.split_once('@') {
    Some((name, item)) => {
      member.name = name.trim().to_owned();
      member.item = Some(item.trim().to_owned());
    }
    None => member.name = first.trim().to_owned(),
  }

  for line in rest {
    let value = |prefix: &str| line.strip_prefix(prefix).map(|v| v.trim().to_owned());
    if let Some(v) = value(ABILITY) {
      member.ability = Some(v);
    } else if let Some(v) = value(TERA) {
      member.tera_type = Some(v);
    } else if let Some(v) = value(EVS) {
      member.evs = Some(v);
    } else if let Some(v) = value(NATURE) {
      member.nature = Some(v);
    } else if let Some(v) = value(MOVE) {
      member.moves.push(v);
    }
  }
  member
}
