use crate::error::{BracketError, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Records `winner_id` as the winner of `match_id` and moves them into the
/// downstream match. An unknown match id leaves the document untouched.
pub fn advance_winner(
  doc: &mut BracketDocument,
  match_id: &str,
  winner_id: &str,
  now: DateTime<Utc>,
) -> Result<()> {
  let Some(current) = doc.matches.get(match_id) else {
    debug!("advance ignored, no match {match_id}");
    return Ok(());
  };
  if current.slots().iter().any(Option::is_none) {
    return Err(BracketError::MatchNotReady(match_id.to_string()));
  }
  if !current.has_participant(winner_id) || doc.is_bye(winner_id) {
    return Err(BracketError::InvalidWinner {
      match_id: match_id.to_string(),
      winner_id: winner_id.to_string(),
    });
  }
  let previous = current.winner_id.clone();
  let next_match_id = current.next_match_id.clone();
  let position = current.position;

  if let Some(current) = doc.matches.get_mut(match_id) {
    current.winner_id = Some(winner_id.to_string());
  }
  if let Some(next_match_id) = next_match_id {
    place_in_next(doc, &next_match_id, position, previous.as_deref(), winner_id);
  }

  doc.updated_at = now;
  doc.status = if doc.champion().is_some() {
    BracketStatus::Completed
  } else {
    BracketStatus::InProgress
  };
  Ok(())
}

/// Same as [`advance_winner`] but leaves `doc` alone and returns the result.
pub fn with_winner(
  doc: &BracketDocument,
  match_id: &str,
  winner_id: &str,
  now: DateTime<Utc>,
) -> Result<BracketDocument> {
  let mut next = doc.clone();
  advance_winner(&mut next, match_id, winner_id, now)?;
  Ok(next)
}

pub fn set_scores(
  doc: &mut BracketDocument,
  match_id: &str,
  score1: Option<u32>,
  score2: Option<u32>,
  now: DateTime<Utc>,
) -> Result<()> {
  let m = doc
    .matches
    .get_mut(match_id)
    .ok_or_else(|| BracketError::MatchNotFound(match_id.to_string()))?;
  m.score1 = score1;
  m.score2 = score2;
  doc.updated_at = now;
  Ok(())
}

/// Clears a played result along with every later result that depended on it.
pub fn reset_match(doc: &mut BracketDocument, match_id: &str, now: DateTime<Utc>) -> Result<()> {
  let current = doc
    .matches
    .get(match_id)
    .ok_or_else(|| BracketError::MatchNotFound(match_id.to_string()))?;
  if is_bye_match(doc, current) {
    return Err(BracketError::ByeMatch(match_id.to_string()));
  }
  let next_match_id = current.next_match_id.clone();

  let cleared = doc.matches.get_mut(match_id).and_then(|m| {
    m.score1 = None;
    m.score2 = None;
    m.winner_id.take()
  });
  if let (Some(winner), Some(next_match_id)) = (cleared, next_match_id) {
    clear_downstream(doc, &next_match_id, &winner);
  }

  doc.updated_at = now;
  refresh_status(doc);
  Ok(())
}

/// Matches with both entrants known and no result yet, in bracket order.
pub fn ready_matches(doc: &BracketDocument) -> Vec<&Match> {
  doc.ordered_matches().into_iter().filter(|m| m.is_ready()).collect()
}

pub fn is_bye_match(doc: &BracketDocument, m: &Match) -> bool {
  m.slots().iter().flatten().any(|id| doc.is_bye(id))
}

/// Recomputes status after results were removed.
pub fn refresh_status(doc: &mut BracketDocument) {
  doc.status = if doc.champion().is_some() {
    BracketStatus::Completed
  } else if doc
    .matches
    .values()
    .any(|m| m.winner_id.is_some() && !is_bye_match(doc, m))
  {
    BracketStatus::InProgress
  } else {
    BracketStatus::Draft
  };
}

fn place_in_next(
  doc: &mut BracketDocument,
  next_match_id: &str,
  feeder_position: usize,
  previous: Option<&str>,
  winner_id: &str,
) {
  let Some(next) = doc.matches.get_mut(next_match_id) else {
    return;
  };
  let target = if pick_slot(next, feeder_position, previous, winner_id) == 0 {
    &mut next.participant1_id
  } else {
    &mut next.participant2_id
  };
  let displaced = target
    .replace(winner_id.to_string())
    .filter(|old| old != winner_id);
  if let Some(displaced) = displaced {
    warn!("{displaced} replaced by {winner_id} in {next_match_id}");
    if next.winner_id.as_deref() == Some(displaced.as_str()) {
      clear_downstream(doc, next_match_id, &displaced);
    }
  }
}

/// Slot this feeder owns: one already holding its old or new winner, then the
/// first empty slot, then the slot matching the feeder's position.
fn pick_slot(next: &Match, feeder_position: usize, previous: Option<&str>, winner_id: &str) -> usize {
  let slots = next.slots();
  let owned = |slot: &Option<&str>| slot.is_some() && (*slot == Some(winner_id) || *slot == previous);
  slots
    .iter()
    .position(owned)
    .or_else(|| slots.iter().position(Option::is_none))
    .unwrap_or(feeder_position % 2)
}

/// Walks downstream from `match_id`, undoing every result won by `removed_id`
/// and pulling them out of the following slot.
fn clear_downstream(doc: &mut BracketDocument, match_id: &str, removed_id: &str) {
  let mut current = match_id.to_string();
  loop {
    let Some(m) = doc.matches.get_mut(&current) else {
      return;
    };
    for slot in [&mut m.participant1_id, &mut m.participant2_id] {
      if slot.as_deref() == Some(removed_id) {
        *slot = None;
      }
    }
    if m.winner_id.as_deref() != Some(removed_id) {
      return;
    }
    warn!("clearing result of {current}, {removed_id} no longer reaches it");
    m.winner_id = None;
    m.score1 = None;
    m.score2 = None;
    let Some(next_match_id) = m.next_match_id.clone() else {
      return;
    };
    current = next_match_id;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bracket::create_bracket;

  fn at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap()
  }

  fn later() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_229_200, 0).unwrap()
  }

  fn id_of(doc: &BracketDocument, name: &str) -> String {
    doc
      .entrants()
      .find(|p| p.name() == Some(name))
      .map(|p| p.id().to_string())
      .unwrap()
  }

  fn cup() -> BracketDocument {
    create_bracket("Cup", &["A", "B", "C", "D"], "u1", at())
  }

  #[test]
  fn test_cup_runs_to_completion() {
    let mut doc = cup();
    let (a, b) = (id_of(&doc, "A"), id_of(&doc, "B"));

    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    advance_winner(&mut doc, "r1m1", &b, later()).unwrap();
    let finals = doc.final_match().unwrap();
    assert_eq!(finals.participant1_id.as_deref(), Some(a.as_str()));
    assert_eq!(finals.participant2_id.as_deref(), Some(b.as_str()));
    assert_eq!(doc.status, BracketStatus::InProgress);
    assert_eq!(doc.updated_at, later());

    advance_winner(&mut doc, "r2m0", &a, later()).unwrap();
    assert_eq!(doc.status, BracketStatus::Completed);
    assert_eq!(doc.champion().and_then(Participant::name), Some("A"));
  }

  #[test]
  fn test_advance_is_idempotent() {
    let mut doc = cup();
    let a = id_of(&doc, "A");
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    let once = doc.clone();
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    assert_eq!(doc, once);
    let finals = doc.final_match().unwrap();
    assert_eq!(finals.slots().iter().filter(|s| **s == Some(a.as_str())).count(), 1);
  }

  #[test]
  fn test_unknown_match_is_noop() {
    let mut doc = cup();
    let before = doc.clone();
    advance_winner(&mut doc, "missing", "whoever", later()).unwrap();
    assert_eq!(doc, before);
  }

  #[test]
  fn test_rejects_outsider_winner() {
    let mut doc = cup();
    let c = id_of(&doc, "C");
    let before = doc.clone();
    let err = advance_winner(&mut doc, "r1m0", &c, later()).unwrap_err();
    assert!(matches!(err, BracketError::InvalidWinner { .. }));
    assert_eq!(doc, before);
  }

  #[test]
  fn test_rejects_bye_winner() {
    let mut doc = create_bracket("Three", &["A", "B", "C"], "u", at());
    let err = advance_winner(&mut doc, "r1m0", "bye-4", later()).unwrap_err();
    assert!(matches!(err, BracketError::InvalidWinner { .. }));
  }

  #[test]
  fn test_corrected_winner_replaces_slot() {
    let mut doc = cup();
    let (a, b, c, d) = (id_of(&doc, "A"), id_of(&doc, "B"), id_of(&doc, "C"), id_of(&doc, "D"));
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    advance_winner(&mut doc, "r1m1", &b, later()).unwrap();
    advance_winner(&mut doc, "r1m0", &d, later()).unwrap();
    let finals = doc.final_match().unwrap();
    assert_eq!(finals.participant1_id.as_deref(), Some(d.as_str()));
    assert_eq!(finals.participant2_id.as_deref(), Some(b.as_str()));
    assert!(!finals.has_participant(&a));
    assert!(!finals.has_participant(&c));
  }

  #[test]
  fn test_correction_clears_dependent_final() {
    let mut doc = cup();
    let (a, b, d) = (id_of(&doc, "A"), id_of(&doc, "B"), id_of(&doc, "D"));
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    advance_winner(&mut doc, "r1m1", &b, later()).unwrap();
    advance_winner(&mut doc, "r2m0", &a, later()).unwrap();
    assert_eq!(doc.status, BracketStatus::Completed);

    advance_winner(&mut doc, "r1m0", &d, later()).unwrap();
    let finals = doc.final_match().unwrap();
    assert!(finals.winner_id.is_none());
    assert!(finals.has_participant(&d));
    assert_eq!(doc.status, BracketStatus::InProgress);
  }

  #[test]
  fn test_odd_feeder_first_takes_first_empty_slot() {
    let mut doc = cup();
    let (a, b) = (id_of(&doc, "A"), id_of(&doc, "B"));
    advance_winner(&mut doc, "r1m1", &b, later()).unwrap();
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    let finals = doc.final_match().unwrap();
    assert_eq!(finals.participant1_id.as_deref(), Some(b.as_str()));
    assert_eq!(finals.participant2_id.as_deref(), Some(a.as_str()));
  }

  #[test]
  fn test_bye_bracket_fills_open_semifinal() {
    let mut doc = create_bracket("Five", &["P1", "P2", "P3", "P4", "P5"], "u", at());
    let p1 = id_of(&doc, "P1");
    let p5 = id_of(&doc, "P5");
    assert_eq!(ready_matches(&doc).into_iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["r1m1", "r2m1"]);

    advance_winner(&mut doc, "r1m1", &p5, later()).unwrap();
    let semi = doc.match_by_id("r2m0").unwrap();
    assert_eq!(semi.participant1_id.as_deref(), Some(p1.as_str()));
    assert_eq!(semi.participant2_id.as_deref(), Some(p5.as_str()));
    assert!(semi.is_ready());
  }

  #[test]
  fn test_readvancing_bye_match_starts_bracket() {
    let mut doc = create_bracket("Five", &["P1", "P2", "P3", "P4", "P5"], "u", at());
    let p1 = id_of(&doc, "P1");
    assert_eq!(doc.status, BracketStatus::Draft);

    advance_winner(&mut doc, "r1m0", &p1, later()).unwrap();
    assert_eq!(doc.status, BracketStatus::InProgress);
    let semi = doc.match_by_id("r2m0").unwrap();
    assert_eq!(semi.slots().iter().filter(|s| **s == Some(p1.as_str())).count(), 1);
  }

  #[test]
  fn test_rejects_match_missing_entrant() {
    let mut doc = create_bracket("Five", &["P1", "P2", "P3", "P4", "P5"], "u", at());
    let (p1, p5) = (id_of(&doc, "P1"), id_of(&doc, "P5"));
    let before = doc.clone();

    let err = advance_winner(&mut doc, "r2m0", &p1, later()).unwrap_err();
    assert!(matches!(err, BracketError::MatchNotReady(_)));
    assert_eq!(doc, before);

    advance_winner(&mut doc, "r1m1", &p5, later()).unwrap();
    let semi = doc.match_by_id("r2m0").unwrap();
    assert!(semi.winner_id.is_none());
    assert!(semi.has_participant(&p5));
  }

  #[test]
  fn test_with_winner_leaves_input_alone() {
    let doc = cup();
    let a = id_of(&doc, "A");
    let next = with_winner(&doc, "r1m0", &a, later()).unwrap();
    assert!(doc.match_by_id("r1m0").unwrap().winner_id.is_none());
    assert_eq!(next.match_by_id("r1m0").unwrap().winner_id.as_deref(), Some(a.as_str()));
    assert_eq!(doc.status, BracketStatus::Draft);
    assert_eq!(next.status, BracketStatus::InProgress);
  }

  #[test]
  fn test_reset_cascades_downstream() {
    let mut doc = cup();
    let (a, b) = (id_of(&doc, "A"), id_of(&doc, "B"));
    advance_winner(&mut doc, "r1m0", &a, later()).unwrap();
    advance_winner(&mut doc, "r1m1", &b, later()).unwrap();
    advance_winner(&mut doc, "r2m0", &a, later()).unwrap();
    set_scores(&mut doc, "r2m0", Some(3), Some(1), later()).unwrap();

    reset_match(&mut doc, "r1m0", later()).unwrap();
    assert!(doc.match_by_id("r1m0").unwrap().winner_id.is_none());
    let finals = doc.final_match().unwrap();
    assert!(finals.winner_id.is_none());
    assert!(finals.score1.is_none());
    assert_eq!(finals.participant1_id, None);
    assert_eq!(finals.participant2_id.as_deref(), Some(b.as_str()));
    assert_eq!(doc.status, BracketStatus::InProgress);

    reset_match(&mut doc, "r1m1", later()).unwrap();
    assert_eq!(doc.status, BracketStatus::Draft);
  }

  #[test]
  fn test_reset_refuses_bye_match() {
    let mut doc = create_bracket("Three", &["A", "B", "C"], "u", at());
    let err = reset_match(&mut doc, "r1m0", later()).unwrap_err();
    assert!(matches!(err, BracketError::ByeMatch(_)));
    let err = reset_match(&mut doc, "nope", later()).unwrap_err();
    assert!(matches!(err, BracketError::MatchNotFound(_)));
  }

  #[test]
  fn test_set_scores() {
    let mut doc = cup();
    set_scores(&mut doc, "r1m1", Some(2), Some(0), later()).unwrap();
    let m = doc.match_by_id("r1m1").unwrap();
    assert_eq!((m.score1, m.score2), (Some(2), Some(0)));
    assert_eq!(doc.updated_at, later());
    assert!(set_scores(&mut doc, "r9m9", None, None, later()).is_err());
  }
}
