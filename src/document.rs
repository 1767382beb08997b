use crate::error::{BracketError, Result};
use crate::types::*;
use std::collections::{HashMap, HashSet};

pub fn to_json(doc: &BracketDocument) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn to_json_pretty(doc: &BracketDocument) -> Result<String> {
  Ok(serde_json::to_string_pretty(doc)?)
}

/// Parses an exported document and checks it still forms a valid bracket.
pub fn from_json(data: &str) -> Result<BracketDocument> {
  let doc = serde_json::from_str::<BracketDocument>(data)?;
  validate(&doc)?;
  Ok(doc)
}

/// Trims names, drops blanks and enforces the minimum field size.
pub fn normalize_names<S: AsRef<str>>(raw: &[S], min_participants: usize) -> Result<Vec<String>> {
  let names = raw
    .iter()
    .map(|name| name.as_ref().trim())
    .filter(|name| !name.is_empty())
    .map(str::to_string)
    .collect::<Vec<_>>();
  if names.len() < min_participants {
    return Err(BracketError::TooFewParticipants {
      min: min_participants,
      got: names.len(),
    });
  }
  Ok(names)
}

pub fn validate(doc: &BracketDocument) -> Result<()> {
  let invalid = |msg: String| Err(BracketError::Invalid(msg));

  let participant_ids = doc.participants.iter().map(Participant::id).collect::<HashSet<_>>();
  if participant_ids.len() != doc.participants.len() {
    return invalid("duplicate participant ids".to_string());
  }

  let mut round_of: HashMap<&str, u32> = HashMap::new();
  for round in &doc.rounds {
    for id in &round.match_ids {
      let Some(m) = doc.matches.get(id) else {
        return invalid(format!("round {} lists unknown match {id}", round.id));
      };
      if m.round_id != round.id {
        return invalid(format!("match {id} belongs to {} but is listed in {}", m.round_id, round.id));
      }
      if round_of.insert(id.as_str(), round.round_number).is_some() {
        return invalid(format!("match {id} listed twice"));
      }
    }
  }
  if round_of.len() != doc.matches.len() {
    return invalid("some matches are not listed in any round".to_string());
  }
  if doc.matches.is_empty() {
    return Ok(());
  }

  let finals = doc.matches.values().filter(|m| m.is_final).collect::<Vec<_>>();
  if finals.len() != 1 {
    return invalid(format!("expected one final match, found {}", finals.len()));
  }

  for m in doc.matches.values() {
    for slot in m.slots().into_iter().flatten() {
      if !participant_ids.contains(slot) {
        return invalid(format!("match {} references unknown participant {slot}", m.id));
      }
    }
    if let Some(winner) = m.winner_id.as_deref() {
      if !m.has_participant(winner) {
        return invalid(format!("winner {winner} of match {} is not in the match", m.id));
      }
    }
    match (m.is_final, m.next_match_id.as_deref()) {
      (true, None) => {}
      (true, Some(_)) => return invalid(format!("final match {} has a next match", m.id)),
      (false, None) => return invalid(format!("match {} has no next match", m.id)),
      (false, Some(next)) => {
        let (Some(own), Some(theirs)) = (round_of.get(m.id.as_str()), round_of.get(next)) else {
          return invalid(format!("match {} links to unknown match {next}", m.id));
        };
        if *theirs != own + 1 {
          return invalid(format!("match {} skips from round {own} to {theirs}", m.id));
        }
      }
    }
  }
  Ok(())
}
