#![warn(clippy::all, missing_docs)]

//! Core engine for redblue, a deterministic turn-based attacker-vs-defender
//! network-intrusion simulation used for teaching security concepts.
//!
//! This crate hosts the topology model, the per-turn state machine, the
//! action-resolution rules with their randomized success/detection rolls,
//! and the win/stop-condition evaluator. Front ends (terminal or otherwise)
//! render state, collect the player's chosen action and target, and export
//! the emitted log; they drive the engine exclusively through [`Game`].
//!
//! With a fixed seed and a fixed sequence of player requests, a run is
//! bit-for-bit reproducible: same log, same final state.

pub mod action;
pub mod config;
pub mod error;
pub mod game;
pub mod rng;
pub mod state;
pub mod topology;
mod win;

pub use action::{Action, ActionKind, ActionSpec};
pub use config::{GameConfig, NodeSpec, TimeLimitPolicy};
pub use error::EngineError;
pub use game::{ActionOutcome, Game};
pub use rng::RngService;
pub use state::{
    Actor, AttackerState, DefenderState, GameState, LogRecord, NodeStatus, Outcome, TurnPhase,
};
pub use topology::Topology;
