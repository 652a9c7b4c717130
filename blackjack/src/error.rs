use thiserror::Error;

use crate::{Action, Card};

/// Every failure here is a defect in the caller's input or in rollout bookkeeping.
/// Nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot draw from an empty deck")]
    EmptyDeck,
    #[error("deck ran out of cards during a trial ({known} cards were known)")]
    InsufficientDeck { known: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("invalid card: {0:?}")]
    InvalidCard(String),
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("{action} is not allowed here: {reason}")]
    IllegalAction { action: Action, reason: String },
    #[error("{requested} trials requested, at least {minimum} required")]
    NotEnoughTrials { requested: u64, minimum: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
