//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Physics constants are per tick; the clock only paces spawns
//! - Seeded RNG only
//! - Obstacles kept in creation order
//! - No rendering or platform dependencies

pub mod geometry;
pub mod spawn;
pub mod state;
pub mod tick;

pub use geometry::{Rect, intersects};
pub use spawn::spawn;
pub use state::{Avatar, GameEvent, GamePhase, ObstaclePair, RunState, Screen, Session};
pub use tick::{TickInput, reset, tick};
