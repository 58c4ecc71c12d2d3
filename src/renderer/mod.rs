//! Rendering boundary
//!
//! The simulation never draws. Each frame the loop hands a read-only session
//! to `Renderer::on_frame`, which turns it into `DrawCommand`s and submits
//! them to whatever `Surface` the host provides.

pub mod shapes;

pub use shapes::{Color, DrawCommand, draw_list};

use thiserror::Error;

use crate::sim::Session;

#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Surface exists but cannot be drawn to right now
    #[error("drawing surface unavailable")]
    Unavailable,
    /// Surface was torn down by the host
    #[error("drawing surface lost")]
    Lost,
}

/// A host drawing target. Frames are bracketed by `begin_frame`/`end_frame`.
pub trait Surface: Send {
    fn begin_frame(&mut self) -> Result<(), SurfaceError>;

    fn draw(&mut self, command: &DrawCommand);

    fn end_frame(&mut self) -> Result<(), SurfaceError>;
}

/// Submits frames and tracks how many made it to the surface
#[derive(Debug, Default)]
pub struct Renderer {
    pub frames_drawn: u64,
    pub frames_skipped: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame. A surface error skips the frame; it is never retried
    /// or propagated.
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S, session: &Session) -> bool {
        match Self::submit(surface, session) {
            Ok(()) => {
                self.frames_drawn += 1;
                true
            }
            Err(e) => {
                self.frames_skipped += 1;
                log::debug!("Skipping frame: {e}");
                false
            }
        }
    }

    fn submit<S: Surface + ?Sized>(surface: &mut S, session: &Session) -> Result<(), SurfaceError> {
        surface.begin_frame()?;
        for command in draw_list(session) {
            surface.draw(&command);
        }
        surface.end_frame()
    }
}
