//! Flapventure - a side-scrolling gate-dodging arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacle spawning, collisions, scoring)
//! - `renderer`: Translates a session snapshot into draw commands for an external surface
//! - `platform`: Loop driver and lifecycle adapter for the hosting view
//! - `settings`: Gameplay configuration and validation

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use platform::{GameView, LoopDriver, RunObserver};
pub use settings::{ConfigError, GameConfig};

/// Game configuration defaults
pub mod consts {
    /// Downward acceleration added to the avatar velocity every tick
    pub const GRAVITY: f32 = 0.5;
    /// Velocity assigned on a jump (negative = up)
    pub const JUMP_IMPULSE: f32 = -10.0;

    /// Obstacle defaults
    pub const PIPE_WIDTH: f32 = 150.0;
    pub const PIPE_GAP: f32 = 600.0;
    /// Horizontal scroll per tick (pixels)
    pub const PIPE_SPEED: f32 = 5.0;
    /// Wall-clock period between spawns
    pub const SPAWN_INTERVAL_MS: u64 = 2000;
    /// Minimum distance between the gap and either screen edge
    pub const MIN_MARGIN: f32 = 100.0;

    /// Avatar sprite size (70x56 scaled by 1.8)
    pub const AVATAR_WIDTH: f32 = 126.0;
    pub const AVATAR_HEIGHT: f32 = 100.8;
    /// Horizontal anchor as a fraction of screen width
    pub const AVATAR_X_FRACTION: f32 = 0.25;
    /// Hitbox shrink per side, as a fraction of the avatar size
    pub const HITBOX_INSET: f32 = 0.1;

    /// Target frame rate of the loop driver
    pub const TARGET_FPS: u32 = 60;
}
