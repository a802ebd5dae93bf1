//! Error types for the rules engine
//!
//! Three separate channels are used:
//! - [`MtgError`] for engine faults (contract violations between a legality
//!   check and the mutation it guards, unknown ids, bad controller answers),
//! - [`NoLegalChoice`] for the recoverable "this cannot be completed now" case,
//! - [`GameOver`] for the end of the game, carried by [`Interrupt`] up to the
//!   driver loop.

use crate::core::{ObjectId, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtgError {
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Already bound to object {0}")]
    AlreadyBound(ObjectId),
}

pub type Result<T> = std::result::Result<T, MtgError>;

/// A requested choice cannot satisfy its minimum count
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No legal choice: {reason}")]
pub struct NoLegalChoice {
    pub reason: String,
}

impl NoLegalChoice {
    pub fn new(reason: impl Into<String>) -> Self {
        NoLegalChoice {
            reason: reason.into(),
        }
    }
}

/// Failure while making the choices for an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    #[error(transparent)]
    NoLegalChoice(#[from] NoLegalChoice),

    #[error(transparent)]
    Fault(#[from] MtgError),
}

pub type ChoiceResult<T> = std::result::Result<T, ChoiceError>;

/// The game has ended
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("game over (winner: {winner:?})")]
pub struct GameOver {
    /// `None` when every remaining player lost simultaneously
    pub winner: Option<PlayerId>,
}

/// Anything that stops the engine mid-computation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Interrupt {
    #[error("{0}")]
    GameOver(#[from] GameOver),

    #[error(transparent)]
    Fault(#[from] MtgError),
}

pub type EngineResult<T> = std::result::Result<T, Interrupt>;
