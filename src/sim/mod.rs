//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod curve;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use state::{
    AnswerResult, GameEvent, GamePhase, GameSession, GameStats, Key, KeyState, Pacing, PoleMarker,
    RoadState, SignPhase,
};
pub use tick::{Command, TickInput, apply_command, tick};
