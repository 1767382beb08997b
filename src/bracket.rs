use crate::error::{BracketError, Result};
use crate::seeding::{bracket_size, generate_seed_order, round_count, round_name};
use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

pub fn match_id(round_number: u32, position: usize) -> String {
  format!("r{round_number}m{position}")
}

pub fn round_id(round_number: u32) -> String {
  format!("r{round_number}")
}

pub fn bye_id(seed: u32) -> String {
  format!("bye-{seed}")
}

/// Builds a single elimination bracket seeded in input order.
pub fn create_bracket<S: AsRef<str>>(
  name: &str,
  participant_names: &[S],
  created_by: &str,
  now: DateTime<Utc>,
) -> BracketDocument {
  let (participants, rounds, matches) = build_single_elim(participant_names);
  let status = initial_status(&participants, &matches);
  BracketDocument {
    id: Uuid::new_v4().to_string(),
    name: name.to_string(),
    description: None,
    participants,
    rounds,
    matches,
    status,
    created_by: created_by.to_string(),
    created_at: now,
    updated_at: now,
    settings: BracketSettings::default(),
  }
}

#[derive(Debug, Clone)]
pub struct BracketBuilder {
  name: String,
  created_by: String,
  description: Option<String>,
  settings: BracketSettings,
}

impl BracketBuilder {
  pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
    BracketBuilder {
      name: name.into(),
      created_by: created_by.into(),
      description: None,
      settings: BracketSettings::default(),
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    let description = description.into();
    self.description = Some(description).filter(|d| !d.trim().is_empty());
    self
  }

  pub fn settings(mut self, settings: BracketSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn build<S: AsRef<str>>(self, participant_names: &[S], now: DateTime<Utc>) -> Result<BracketDocument> {
    if self.settings.elimination_type != EliminationType::Single {
      return Err(BracketError::UnsupportedFormat("double elimination".to_string()));
    }
    let mut doc = create_bracket(&self.name, participant_names, &self.created_by, now);
    doc.description = self.description;
    doc.settings = self.settings;
    Ok(doc)
  }
}

fn initial_status(participants: &[Participant], matches: &HashMap<String, Match>) -> BracketStatus {
  let entrants = participants.iter().filter(|p| !p.is_bye()).count();
  if matches.is_empty() && entrants == 1 {
    BracketStatus::Completed
  } else {
    BracketStatus::Draft
  }
}

fn build_single_elim<S: AsRef<str>>(
  participant_names: &[S],
) -> (Vec<Participant>, Vec<Round>, HashMap<String, Match>) {
  let mut participants = participant_names
    .iter()
    .enumerate()
    .map(|(idx, name)| Participant::Entrant {
      id: Uuid::new_v4().to_string(),
      name: name.as_ref().to_string(),
      seed: idx as u32 + 1,
    })
    .collect::<Vec<_>>();

  let entrant_count = participants.len();
  let total_rounds = round_count(entrant_count);
  if total_rounds == 0 {
    return (participants, Vec::new(), HashMap::new());
  }

  let size = bracket_size(entrant_count);
  for seed in (entrant_count as u32 + 1..=size).rev() {
    participants.push(Participant::Bye { id: bye_id(seed), seed });
  }

  let (rounds, matches) = build_rounds(&participants, size, total_rounds);
  (participants, rounds, matches)
}

/// Lays out every round, linking each match to the one its winner feeds.
fn build_rounds(
  participants: &[Participant],
  size: u32,
  total_rounds: u32,
) -> (Vec<Round>, HashMap<String, Match>) {
  let seed_map = participants
    .iter()
    .map(|p| (p.seed(), p))
    .collect::<HashMap<_, _>>();
  let by_id = participants
    .iter()
    .map(|p| (p.id(), p))
    .collect::<HashMap<_, _>>();

  let seeds = generate_seed_order(size);
  let mut matches: HashMap<String, Match> = HashMap::new();
  let mut rounds = Vec::with_capacity(total_rounds as usize);
  let mut previous: Vec<String> = Vec::new();

  for round_number in 1..=total_rounds {
    let count = (size >> round_number) as usize;
    let mut ids = Vec::with_capacity(count);
    for position in 0..count {
      let (slot_a, slot_b) = if round_number == 1 {
        let seed_a = seeds[position * 2];
        let seed_b = seeds[position * 2 + 1];
        (
          seed_map.get(&seed_a).map(|p| p.id().to_string()),
          seed_map.get(&seed_b).map(|p| p.id().to_string()),
        )
      } else {
        (
          feeder_winner(&matches, &previous[position * 2]),
          feeder_winner(&matches, &previous[position * 2 + 1]),
        )
      };

      let id = match_id(round_number, position);
      if round_number > 1 {
        for feeder in &previous[position * 2..position * 2 + 2] {
          if let Some(feeder) = matches.get_mut(feeder) {
            feeder.next_match_id = Some(id.clone());
          }
        }
      }

      let winner_id = bye_winner(&by_id, slot_a.as_deref(), slot_b.as_deref());
      if let Some(winner) = winner_id.as_deref() {
        debug!("bye auto-advance: {winner} wins {id}");
      }
      matches.insert(
        id.clone(),
        Match {
          id: id.clone(),
          round_id: round_id(round_number),
          position,
          participant1_id: slot_a,
          participant2_id: slot_b,
          winner_id,
          score1: None,
          score2: None,
          next_match_id: None,
          is_final: round_number == total_rounds,
        },
      );
      ids.push(id);
    }

    rounds.push(Round {
      id: round_id(round_number),
      name: round_name(round_number, total_rounds),
      round_number,
      match_ids: ids.clone(),
    });
    previous = ids;
  }

  (rounds, matches)
}

fn feeder_winner(matches: &HashMap<String, Match>, feeder_id: &str) -> Option<String> {
  matches.get(feeder_id).and_then(|m| m.winner_id.clone())
}

/// Real entrant facing a bye wins outright. Bye against bye, or a slot still
/// waiting on its feeder, stays open.
fn bye_winner(by_id: &HashMap<&str, &Participant>, slot_a: Option<&str>, slot_b: Option<&str>) -> Option<String> {
  let is_bye = |slot: Option<&str>| slot.and_then(|id| by_id.get(id)).is_some_and(|p| p.is_bye());
  match (slot_a, slot_b) {
    (Some(a), Some(_)) if !is_bye(slot_a) && is_bye(slot_b) => Some(a.to_string()),
    (Some(_), Some(b)) if is_bye(slot_a) && !is_bye(slot_b) => Some(b.to_string()),
    _ => None,
  }
}
