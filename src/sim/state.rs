//! Game state and core simulation types
//!
//! A `Session` owns everything one run needs: config, screen bounds, the
//! avatar, the run state and the seeded RNG. Only the loop thread touches it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, intersects};
use crate::settings::{ConfigError, GameConfig};

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Avatar alive, world scrolling
    #[default]
    Playing,
    /// Run ended by a collision or leaving the screen
    GameOver,
}

/// Things that happened during a tick, for audio/UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Spawned { id: u32 },
    Scored { score: u32 },
    /// Fired once, on the tick the run becomes terminal
    RunEnded { score: u32 },
}

/// The player-controlled sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner
    pub pos: Vec2,
    /// Vertical velocity in pixels per tick (positive = down)
    pub vel_y: f32,
    pub size: Vec2,
}

impl Avatar {
    /// Avatar at its start position: `avatar_x_fraction` across, vertically centred
    pub fn new(config: &GameConfig, screen: Screen) -> Self {
        let size = Vec2::new(config.avatar_width, config.avatar_height);
        Self {
            pos: Vec2::new(
                screen.width * config.avatar_x_fraction,
                screen.height / 2.0 - size.y / 2.0,
            ),
            vel_y: 0.0,
            size,
        }
    }

    /// Visual bounds
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    /// Collision rect, shrunk by `inset` of the avatar size on every side
    pub fn hitbox(&self, inset: f32) -> Rect {
        self.bounds().inset(inset)
    }
}

/// A top/bottom gate scrolling left as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePair {
    pub id: u32,
    pub top: Rect,
    pub bottom: Rect,
    /// Set once the pair has passed the avatar
    pub scored: bool,
}

impl ObstaclePair {
    pub fn new(id: u32, top: Rect, bottom: Rect) -> Self {
        Self {
            id,
            top,
            bottom,
            scored: false,
        }
    }

    /// Leading (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.top.right
    }

    /// Vertical opening between the two rects
    #[inline]
    pub fn gap(&self) -> f32 {
        self.bottom.top - self.top.bottom
    }

    pub fn scroll(&mut self, dx: f32) {
        self.top.translate_x(dx);
        self.bottom.translate_x(dx);
    }

    pub fn collides(&self, hitbox: &Rect) -> bool {
        intersects(hitbox, &self.top) || intersects(hitbox, &self.bottom)
    }
}

/// Per-run state; replaced wholesale on reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Active obstacles in creation order (left to right)
    pub obstacles: Vec<ObstaclePair>,
    pub score: u32,
    pub phase: GamePhase,
    /// Wall-clock time of the last spawn (or of run start)
    pub last_spawn_ms: u64,
    next_id: u32,
}

impl RunState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            score: 0,
            phase: GamePhase::Playing,
            last_spawn_ms: now_ms,
            next_id: 1,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Allocate an obstacle id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// One game session: everything the loop thread owns
#[derive(Debug, Clone)]
pub struct Session {
    pub config: GameConfig,
    pub screen: Screen,
    pub avatar: Avatar,
    pub run: RunState,
    /// Seed the RNG was created from, for reproducing a session
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl Session {
    /// Create a session; fails if the config cannot work on this screen
    pub fn new(
        config: GameConfig,
        screen: Screen,
        seed: u64,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate(screen)?;
        log::info!(
            "New session {}x{} (seed {seed}, gap {}, spawn every {} ms)",
            screen.width,
            screen.height,
            config.pipe_gap,
            config.spawn_interval_ms
        );
        Ok(Self {
            avatar: Avatar::new(&config, screen),
            run: RunState::new(now_ms),
            config,
            screen,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Put the avatar back at its start position and begin a fresh run.
    /// The RNG stream carries on.
    pub fn reset(&mut self, now_ms: u64) {
        self.avatar = Avatar::new(&self.config, self.screen);
        self.run = RunState::new(now_ms);
        log::info!("Run reset");
    }

    /// Adopt new screen bounds without touching the run. The avatar stays
    /// where it is; the next reset places it against the new bounds.
    pub fn resize(&mut self, screen: Screen) -> Result<(), ConfigError> {
        self.config.validate(screen)?;
        self.screen = screen;
        log::debug!("Session resized to {}x{}", screen.width, screen.height);
        Ok(())
    }

    /// Avatar plus run state as JSON, for debug dumps
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            screen: Screen,
            avatar: &'a Avatar,
            run: &'a RunState,
        }
        serde_json::to_string(&Snapshot {
            screen: self.screen,
            avatar: &self.avatar,
            run: &self.run,
        })
    }
}
