use std::fmt;

use serde::{Deserialize, Serialize};

use super::attributes::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    DuplicateCard { card_id: String },
    IndexMismatch { card_id: String, slot: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameError {
    AttributeSpaceExhausted {
        difficulty: Difficulty,
        taken: usize,
    },
    ConfigurationMissing {
        field: String,
    },
    ConfigurationInvalid {
        field: String,
        value: String,
    },
    RoundNotRunning,
    RoundAlreadyRunning,
    CardNotOnBoard {
        card_id: String,
    },
    Integrity {
        error: IntegrityError,
    },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::DuplicateCard { card_id } => {
                write!(f, "card {card_id} appears more than once on the board")
            }
            IntegrityError::IndexMismatch { card_id, slot } => {
                write!(f, "board index points {card_id} at slot {slot} which holds another card")
            }
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::AttributeSpaceExhausted { difficulty, taken } => write!(
                f,
                "no unused card left in {difficulty} mode ({taken} of {} taken)",
                difficulty.combinations()
            ),
            GameError::ConfigurationMissing { field } => {
                write!(f, "configuration value `{field}` was not provided")
            }
            GameError::ConfigurationInvalid { field, value } => {
                write!(f, "configuration value `{field}` is invalid: {value:?}")
            }
            GameError::RoundNotRunning => f.write_str("no round is running"),
            GameError::RoundAlreadyRunning => f.write_str("a round is already running"),
            GameError::CardNotOnBoard { card_id } => write!(f, "card {card_id} is not on the board"),
            GameError::Integrity { error } => write!(f, "board integrity violated: {error}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<IntegrityError> for GameError {
    fn from(error: IntegrityError) -> Self {
        GameError::Integrity { error }
    }
}
