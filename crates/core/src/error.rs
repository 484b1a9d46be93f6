//! Engine error taxonomy.
//!
//! Only [`EngineError::Configuration`] is fatal (game creation aborts). Every
//! in-run variant is a rejected request: state is left untouched and remains
//! valid for the next request.

use thiserror::Error;

use crate::state::{Outcome, TurnPhase};

/// Errors surfaced across the engine boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed topology or configuration detected at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Target missing, unreachable, or failing an action precondition.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Funds or budget too low to pay the action's cost.
    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        needed: u32,
        available: u32,
    },

    /// Per-phase action allowance already spent.
    #[error("action budget exhausted for the {0} phase")]
    BudgetExceeded(TurnPhase),

    /// Action submitted by the actor whose phase it is not.
    #[error("{action} is a {expected}-phase action, current phase is {actual}")]
    WrongPhase {
        action: &'static str,
        expected: TurnPhase,
        actual: TurnPhase,
    },

    /// Run already reached a terminal outcome.
    #[error("game is over: {0}")]
    GameOver(Outcome),
}
