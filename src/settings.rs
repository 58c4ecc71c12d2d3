//! Gameplay configuration
//!
//! Fixed when a session starts; never hot-reloaded mid-run. Loaded from JSON
//! on disk when a path is given, otherwise the canonical defaults apply.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Screen;

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV_VAR: &str = "FLAPVENTURE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("screen {width}x{height} is not a drawable size")]
    InvalidScreen { width: f32, height: f32 },
    #[error(
        "screen height {height} leaves no room for a {gap} gap with {margin} margins; \
         obstacle spawn range would be empty"
    )]
    EmptySpawnRange { height: f32, gap: f32, margin: f32 },
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Gameplay constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Avatar physics ===
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative = up)
    pub jump_impulse: f32,

    // === Obstacles ===
    pub pipe_width: f32,
    /// Vertical opening between top and bottom rects
    pub pipe_gap: f32,
    /// Leftward scroll per tick
    pub pipe_speed: f32,
    pub spawn_interval_ms: u64,
    /// Minimum distance from the gap to either screen edge
    pub min_margin: f32,

    // === Avatar geometry ===
    pub avatar_width: f32,
    pub avatar_height: f32,
    /// Horizontal anchor as a fraction of screen width
    pub avatar_x_fraction: f32,
    /// Hitbox shrink per side as a fraction of avatar size (0.0 - 0.5)
    pub hitbox_inset: f32,

    // === Loop ===
    pub target_fps: u32,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,

            pipe_width: PIPE_WIDTH,
            pipe_gap: PIPE_GAP,
            pipe_speed: PIPE_SPEED,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_margin: MIN_MARGIN,

            avatar_width: AVATAR_WIDTH,
            avatar_height: AVATAR_HEIGHT,
            avatar_x_fraction: AVATAR_X_FRACTION,
            hitbox_inset: HITBOX_INSET,

            target_fps: TARGET_FPS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `FLAPVENTURE_CONFIG` if set, defaults otherwise
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default config");
                Ok(Self::default())
            }
        }
    }

    /// Time allotted to one update/render/pace iteration
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }

    /// Check the config against a screen size. Fails fast on anything that
    /// would make spawning or the loop degenerate.
    pub fn validate(&self, screen: Screen) -> Result<(), ConfigError> {
        let drawable = |v: f32| v.is_finite() && v > 0.0;
        if !drawable(screen.width) || !drawable(screen.height) {
            return Err(ConfigError::InvalidScreen {
                width: screen.width,
                height: screen.height,
            });
        }

        positive("pipe_width", self.pipe_width)?;
        positive("pipe_gap", self.pipe_gap)?;
        positive("avatar_width", self.avatar_width)?;
        positive("avatar_height", self.avatar_height)?;
        finite("gravity", self.gravity)?;
        finite("jump_impulse", self.jump_impulse)?;
        positive("pipe_speed", self.pipe_speed)?;

        if !(0.0..0.5).contains(&self.hitbox_inset) {
            return Err(ConfigError::OutOfRange {
                field: "hitbox_inset",
                expected: "in [0.0, 0.5)",
                value: f64::from(self.hitbox_inset),
            });
        }
        if !(0.0..=1.0).contains(&self.avatar_x_fraction) {
            return Err(ConfigError::OutOfRange {
                field: "avatar_x_fraction",
                expected: "in [0.0, 1.0]",
                value: f64::from(self.avatar_x_fraction),
            });
        }
        if !self.min_margin.is_finite() || self.min_margin < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "min_margin",
                expected: "non-negative",
                value: f64::from(self.min_margin),
            });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::OutOfRange {
                field: "target_fps",
                expected: "positive",
                value: 0.0,
            });
        }

        // Top-gap height is drawn from [margin, height - gap - margin)
        if screen.height - self.pipe_gap - self.min_margin <= self.min_margin {
            return Err(ConfigError::EmptySpawnRange {
                height: screen.height,
                gap: self.pipe_gap,
                margin: self.min_margin,
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "positive",
            value: f64::from(value),
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite",
            value: f64::from(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fit_portrait_phone() {
        let config = GameConfig::default();
        assert!(config.validate(Screen::new(1080.0, 1920.0)).is_ok());
    }

    #[test]
    fn test_short_screen_rejected() {
        let config = GameConfig::default();
        // 600 gap + 2 * 100 margin = 800, so the range is empty at 800
        let err = config.validate(Screen::new(1080.0, 800.0)).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySpawnRange { .. }));

        assert!(config.validate(Screen::new(1080.0, 801.0)).is_ok());
    }

    #[test]
    fn test_zero_screen_rejected() {
        let config = GameConfig::default();
        let err = config.validate(Screen::new(0.0, 1920.0)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScreen { .. }));
    }

    #[test]
    fn test_inset_range() {
        let config = GameConfig {
            hitbox_inset: 0.5,
            ..Default::default()
        };
        let err = config.validate(Screen::new(1080.0, 1920.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "hitbox_inset",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let config = GameConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert!(config.validate(Screen::new(1080.0, 1920.0)).is_err());
    }

    #[test]
    fn test_zero_speed_rejected() {
        let config = GameConfig {
            pipe_speed: 0.0,
            ..Default::default()
        };
        let err = config.validate(Screen::new(1080.0, 1920.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "pipe_speed",
                ..
            }
        ));

        let backwards = GameConfig {
            pipe_speed: -5.0,
            ..Default::default()
        };
        assert!(backwards.validate(Screen::new(1080.0, 1920.0)).is_err());
    }

    #[test]
    fn test_frame_budget_60hz() {
        let budget = GameConfig::default().frame_budget();
        assert!((budget.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"pipe_gap": 500.0, "seed": 7}"#).unwrap();
        assert_eq!(config.pipe_gap, 500.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.gravity, GRAVITY);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/nonexistent/flapventure.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
