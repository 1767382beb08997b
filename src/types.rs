use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_MIN_PARTICIPANTS: usize = 2;
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Largest field the `seeds` command will print.
pub const MAX_SEED_ORDER_SIZE: u32 = 1 << 16;
pub const FINALS_LABEL: &str = "Finals";
pub const SEMIFINALS_LABEL: &str = "Semifinals";
pub const QUARTERFINALS_LABEL: &str = "Quarterfinals";

// ── Participants ───────────────────────────────────────────────────────

/// An entry in the bracket field. Byes only pad the field to a power of two
/// and are never shown as entrants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Participant {
    Entrant { id: String, name: String, seed: u32 },
    Bye { id: String, seed: u32 },
}

impl Participant {
    pub fn id(&self) -> &str {
        match self {
            Participant::Entrant { id, .. } | Participant::Bye { id, .. } => id,
        }
    }

    pub fn seed(&self) -> u32 {
        match self {
            Participant::Entrant { seed, .. } | Participant::Bye { seed, .. } => *seed,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Participant::Bye { .. })
    }

    /// Display name, `None` for byes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Participant::Entrant { name, .. } => Some(name),
            Participant::Bye { .. } => None,
        }
    }
}

// ── Matches and rounds ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round_id: String,
    pub position: usize,
    pub participant1_id: Option<String>,
    pub participant2_id: Option<String>,
    pub winner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    pub next_match_id: Option<String>,
    pub is_final: bool,
}

impl Match {
    pub fn slots(&self) -> [Option<&str>; 2] {
        [self.participant1_id.as_deref(), self.participant2_id.as_deref()]
    }

    pub fn has_participant(&self, id: &str) -> bool {
        self.slots().iter().any(|slot| *slot == Some(id))
    }

    pub fn is_ready(&self) -> bool {
        self.winner_id.is_none() && self.participant1_id.is_some() && self.participant2_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    pub name: String,
    pub round_number: u32,
    pub match_ids: Vec<String>,
}

// ── Document ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    Draft,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliminationType {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSettings {
    pub third_place_match: bool,
    pub elimination_type: EliminationType,
}

impl Default for BracketSettings {
    fn default() -> Self {
        Self {
            third_place_match: false,
            elimination_type: EliminationType::Single,
        }
    }
}

/// Aggregate root. Matches live in a flat map keyed by id and link to their
/// downstream match through `next_match_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketDocument {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub participants: Vec<Participant>,
    pub rounds: Vec<Round>,
    pub matches: HashMap<String, Match>,
    pub status: BracketStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub settings: BracketSettings,
}

impl BracketDocument {
    pub fn match_by_id(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn final_match(&self) -> Option<&Match> {
        self.matches.values().find(|m| m.is_final)
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn participant_name(&self, id: &str) -> Option<&str> {
        self.participant(id).and_then(Participant::name)
    }

    pub fn is_bye(&self, id: &str) -> bool {
        self.participant(id).is_some_and(Participant::is_bye)
    }

    pub fn entrants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| !p.is_bye())
    }

    /// Matches of a round in bracket order.
    pub fn round_matches(&self, round_number: u32) -> Vec<&Match> {
        self.rounds
            .iter()
            .find(|round| round.round_number == round_number)
            .map(|round| {
                round
                    .match_ids
                    .iter()
                    .filter_map(|id| self.matches.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Matches in round order, then by position.
    pub fn ordered_matches(&self) -> Vec<&Match> {
        self.rounds
            .iter()
            .flat_map(|round| round.match_ids.iter())
            .filter_map(|id| self.matches.get(id))
            .collect()
    }

    /// Final winner, or the lone entrant of a one-entrant bracket.
    pub fn champion(&self) -> Option<&Participant> {
        if self.matches.is_empty() {
            let mut entrants = self.entrants();
            let only = entrants.next()?;
            return entrants.next().is_none().then_some(only);
        }
        let winner = self.final_match()?.winner_id.as_deref()?;
        self.participant(winner)
    }
}

// ── Config types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub min_participants: usize,
    pub third_place_match: bool,
    pub default_created_by: String,
    pub pretty_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: String::new(),
            min_participants: DEFAULT_MIN_PARTICIPANTS,
            third_place_match: false,
            default_created_by: "local".to_string(),
            pretty_json: true,
        }
    }
}

impl AppConfig {
    pub fn bracket_settings(&self) -> BracketSettings {
        BracketSettings {
            third_place_match: self.third_place_match,
            ..BracketSettings::default()
        }
    }
}
