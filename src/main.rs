//! Flapventure entry point
//!
//! Headless host: drives the core loop against a surface that only logs,
//! tapping on a fixed rhythm, then prints how the runs went.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flapventure::platform::DriverError;
use flapventure::renderer::{DrawCommand, Surface, SurfaceError};
use flapventure::{GameConfig, GameView};

const SCREEN_WIDTH: f32 = 1080.0;
const SCREEN_HEIGHT: f32 = 1920.0;
const DEMO_TAPS: u32 = 40;
const TAP_INTERVAL: Duration = Duration::from_millis(450);

/// Surface that logs the score label once a second
#[derive(Default)]
struct LogSurface {
    frame: u64,
}

impl Surface for LogSurface {
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        self.frame += 1;
        Ok(())
    }

    fn draw(&mut self, command: &DrawCommand) {
        if let DrawCommand::Text { text, .. } = command
            && self.frame % 60 == 0
        {
            log::info!("frame {}: {text}", self.frame);
        }
    }

    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}

fn run() -> Result<(), DriverError> {
    let config = GameConfig::from_env()?;
    let (ended_tx, ended_rx) = mpsc::channel();

    let mut view = GameView::new(config, move |score: u32| {
        let _ = ended_tx.send(score);
    });
    view.on_surface_ready(SCREEN_WIDTH, SCREEN_HEIGHT, LogSurface::default())?;

    for _ in 0..DEMO_TAPS {
        thread::sleep(TAP_INTERVAL);
        view.on_input_down();
    }
    view.on_surface_lost();

    for (i, score) in ended_rx.try_iter().enumerate() {
        println!("Run {} ended with score {score}", i + 1);
    }
    if let Some(session) = view.paused_session() {
        match session.snapshot_json() {
            Ok(json) => log::debug!("Final state: {json}"),
            Err(e) => log::warn!("Could not serialize final state: {e}"),
        }
        println!("Current run score: {}", session.run.score);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
