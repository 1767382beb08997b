use thiserror::Error;

/// Failures surfaced by the bracket engine.
#[derive(Error, Debug)]
pub enum BracketError {
    /// Declared winner is not one of the match's two entrants.
    #[error("{winner_id} cannot win match {match_id}")]
    InvalidWinner { match_id: String, winner_id: String },

    #[error("match {0} not found")]
    MatchNotFound(String),

    /// Match is still waiting on an entrant from an earlier round.
    #[error("match {0} is missing entrants")]
    MatchNotReady(String),

    /// Match was decided at build time by a BYE.
    #[error("match {0} was auto-advanced by a bye")]
    ByeMatch(String),

    #[error("need at least {min} participants, got {got}")]
    TooFewParticipants { min: usize, got: usize },

    #[error("unsupported bracket format: {0}")]
    UnsupportedFormat(String),

    /// Imported document breaks a structural invariant.
    #[error("invalid bracket document: {0}")]
    Invalid(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BracketError>;
