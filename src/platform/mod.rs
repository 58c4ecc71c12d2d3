//! Platform abstraction layer
//!
//! The hosting view (window, activity, terminal...) owns the drawing surface
//! and forwards its lifecycle callbacks here:
//! - surface ready / lost start and stop the loop driver
//! - resize updates screen bounds without resetting the run
//! - input down becomes a queued jump-or-restart

pub mod driver;

pub use driver::{DriverError, LoopDriver, RunObserver};

use crate::renderer::Surface;
use crate::settings::{ConfigError, GameConfig};
use crate::sim::{Screen, Session};

/// Thin lifecycle adapter in front of a `LoopDriver`
pub struct GameView<O> {
    driver: LoopDriver,
    observer: O,
}

impl<O: RunObserver + Clone + 'static> GameView<O> {
    pub fn new(config: GameConfig, observer: O) -> Self {
        Self {
            driver: LoopDriver::new(config),
            observer,
        }
    }

    /// Surface created: start the loop on it
    pub fn on_surface_ready<S: Surface + 'static>(
        &mut self,
        width: f32,
        height: f32,
        surface: S,
    ) -> Result<(), DriverError> {
        self.driver
            .start(Screen::new(width, height), surface, self.observer.clone())
    }

    /// Surface about to be destroyed: blocks until the loop has exited
    pub fn on_surface_lost(&mut self) {
        self.driver.stop();
    }

    pub fn on_resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        self.driver.resize(Screen::new(width, height)).inspect_err(|e| {
            log::warn!("Rejected resize to {width}x{height}: {e}");
        })
    }

    pub fn on_input_down(&self) {
        self.driver.jump();
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Session parked while the surface is gone
    pub fn paused_session(&self) -> Option<&Session> {
        self.driver.paused_session()
    }
}
