//! Loop driver: one dedicated thread running tick -> render -> pace
//!
//! The running flag is the only state shared with the lifecycle thread.
//! Input and resize requests cross over as queued commands; the session
//! itself is moved into the loop thread on start and handed back on stop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::renderer::{Renderer, Surface};
use crate::settings::{ConfigError, GameConfig};
use crate::sim::{GameEvent, Screen, Session, TickInput, tick};

/// Receives the one-shot end-of-run signal, on the loop thread. Must not
/// feed back into game state synchronously.
pub trait RunObserver: Send {
    fn on_run_ended(&mut self, score: u32);
}

impl<F: FnMut(u32) + Send> RunObserver for F {
    fn on_run_ended(&mut self, score: u32) {
        self(score)
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Requests queued from the lifecycle thread, drained at the top of a frame
#[derive(Debug, Clone, Copy)]
enum Command {
    Jump,
    Resize(Screen),
}

struct Worker {
    handle: JoinHandle<Session>,
    commands: Sender<Command>,
}

/// Owns the loop thread. Stopped -> Running -> Stopped.
pub struct LoopDriver {
    config: GameConfig,
    running: Arc<AtomicBool>,
    worker: Option<Worker>,
    /// Session parked while stopped; resumed by the next `start`
    paused: Option<Session>,
    /// Origin of the millisecond clock fed to `tick`
    epoch: Instant,
}

impl LoopDriver {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            paused: None,
            epoch: Instant::now(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The session held while stopped
    pub fn paused_session(&self) -> Option<&Session> {
        self.paused.as_ref()
    }

    /// Start the loop on `screen`, drawing to `surface`. Resumes the parked
    /// session if there is one, otherwise creates a new one. Starting an
    /// already running driver is a no-op.
    pub fn start<S, O>(&mut self, screen: Screen, surface: S, observer: O) -> Result<(), DriverError>
    where
        S: Surface + 'static,
        O: RunObserver + 'static,
    {
        if self.worker.is_some() {
            log::warn!("Loop already running");
            return Ok(());
        }

        self.config.validate(screen)?;
        let session = match self.paused.take() {
            Some(mut session) => {
                if let Err(e) = session.resize(screen) {
                    self.paused = Some(session);
                    return Err(e.into());
                }
                log::info!("Resuming session (score {})", session.run.score);
                session
            }
            None => {
                let seed = self.config.seed.unwrap_or_else(clock_seed);
                Session::new(self.config.clone(), screen, seed, self.now_ms())?
            }
        };

        let (commands, inbox) = mpsc::channel();
        let running = Arc::clone(&self.running);
        let epoch = self.epoch;
        let budget = self.config.frame_budget();

        running.store(true, Ordering::Release);
        let spawned = thread::Builder::new()
            .name("flapventure-loop".to_string())
            .spawn(move || run_loop(session, surface, observer, running, inbox, epoch, budget));

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { handle, commands });
                log::info!("Loop started ({:?} per frame)", budget);
                Ok(())
            }
            Err(e) => {
                // The session went down with the closure; the next start begins fresh
                self.running.store(false, Ordering::Release);
                Err(DriverError::Spawn(e))
            }
        }
    }

    /// Stop the loop and wait for the thread to exit. No draw call happens
    /// after this returns.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.running.store(false, Ordering::Release);
        // Cut the pacing sleep short
        worker.handle.thread().unpark();

        match worker.handle.join() {
            Ok(session) => {
                log::info!("Loop stopped (score {})", session.run.score);
                self.paused = Some(session);
            }
            Err(_) => log::error!("Loop thread panicked; session discarded"),
        }
    }

    /// Queue a tap for the next frame. Ignored while stopped.
    pub fn jump(&self) {
        match &self.worker {
            Some(worker) => {
                if worker.commands.send(Command::Jump).is_err() {
                    log::debug!("Loop thread gone; dropping input");
                }
            }
            None => log::debug!("Ignoring input while stopped"),
        }
    }

    /// Adopt a new screen size without resetting the run
    pub fn resize(&mut self, screen: Screen) -> Result<(), ConfigError> {
        self.config.validate(screen)?;
        match (&self.worker, &mut self.paused) {
            (Some(worker), _) => {
                if worker.commands.send(Command::Resize(screen)).is_err() {
                    log::debug!("Loop thread gone; dropping resize");
                }
            }
            (None, Some(session)) => session.resize(screen)?,
            (None, None) => {}
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        millis_since(self.epoch)
    }
}

impl Drop for LoopDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<S: Surface, O: RunObserver>(
    mut session: Session,
    mut surface: S,
    mut observer: O,
    running: Arc<AtomicBool>,
    inbox: Receiver<Command>,
    epoch: Instant,
    budget: Duration,
) -> Session {
    let mut renderer = Renderer::new();

    while running.load(Ordering::Acquire) {
        let frame_start = Instant::now();

        let mut input = TickInput::default();
        for command in inbox.try_iter() {
            match command {
                Command::Jump => input.jump = true,
                Command::Resize(screen) => {
                    if let Err(e) = session.resize(screen) {
                        log::warn!("Ignoring resize: {e}");
                    }
                }
            }
        }

        for event in tick(&mut session, &input, millis_since(epoch)) {
            if let GameEvent::RunEnded { score } = event {
                observer.on_run_ended(score);
            }
        }

        renderer.on_frame(&mut surface, &session);

        pace(&running, frame_start + budget);
    }

    log::debug!(
        "Loop exiting: {} frames drawn, {} skipped",
        renderer.frames_drawn,
        renderer.frames_skipped
    );
    session
}

/// Park until `deadline`. A stop request wakes the thread early, which is
/// just the normal way out of the loop.
fn pace(running: &AtomicBool, deadline: Instant) {
    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::park_timeout(deadline - now);
    }
}

fn millis_since(epoch: Instant) -> u64 {
    u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, SurfaceError};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Counts frames; optionally refuses every frame
    #[derive(Clone, Default)]
    struct CountingSurface {
        frames: Arc<AtomicUsize>,
        draws: Arc<AtomicUsize>,
        invalid: bool,
    }

    impl Surface for CountingSurface {
        fn begin_frame(&mut self) -> Result<(), SurfaceError> {
            self.frames.fetch_add(1, Ordering::SeqCst);
            if self.invalid {
                Err(SurfaceError::Lost)
            } else {
                Ok(())
            }
        }

        fn draw(&mut self, _command: &DrawCommand) {
            self.draws.fetch_add(1, Ordering::SeqCst);
        }

        fn end_frame(&mut self) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    fn screen() -> Screen {
        Screen::new(1080.0, 1920.0)
    }

    fn seeded() -> GameConfig {
        GameConfig {
            seed: Some(77),
            ..Default::default()
        }
    }

    #[test]
    fn test_start_stop_draws_then_halts() {
        let surface = CountingSurface::default();
        let frames = Arc::clone(&surface.frames);
        let mut driver = LoopDriver::new(seeded());

        driver.start(screen(), surface, |_score: u32| {}).unwrap();
        assert!(driver.is_running());
        thread::sleep(Duration::from_millis(100));
        driver.stop();
        assert!(!driver.is_running());

        let drawn = frames.load(Ordering::SeqCst);
        assert!(drawn >= 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(frames.load(Ordering::SeqCst), drawn);
        assert!(driver.paused_session().is_some());
    }

    #[test]
    fn test_loop_paces_to_frame_budget() {
        let surface = CountingSurface::default();
        let frames = Arc::clone(&surface.frames);
        let mut driver = LoopDriver::new(seeded());

        driver.start(screen(), surface, |_score: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(100));
        driver.stop();

        // ~6 frames at 60 Hz; an unpaced loop would run thousands
        let drawn = frames.load(Ordering::SeqCst);
        assert!(drawn >= 1);
        assert!(drawn <= 12, "{drawn} frames in 100 ms");
    }

    #[test]
    fn test_start_rejects_short_screen() {
        let mut driver = LoopDriver::new(seeded());
        let err = driver
            .start(Screen::new(1080.0, 600.0), CountingSurface::default(), |_score: u32| {})
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::Config(ConfigError::EmptySpawnRange { .. })
        ));
        assert!(!driver.is_running());
    }

    #[test]
    fn test_run_ended_fires_once() {
        // Falls off the screen on the first tick
        let config = GameConfig {
            gravity: 5000.0,
            ..seeded()
        };
        let ended = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ended);

        let mut driver = LoopDriver::new(config);
        driver
            .start(screen(), CountingSurface::default(), move |score: u32| {
                sink.lock().unwrap().push(score)
            })
            .unwrap();
        thread::sleep(Duration::from_millis(120));
        driver.stop();

        assert_eq!(*ended.lock().unwrap(), vec![0]);
        assert!(driver.paused_session().unwrap().run.is_over());
    }

    #[test]
    fn test_invalid_surface_keeps_looping() {
        let surface = CountingSurface {
            invalid: true,
            ..Default::default()
        };
        let frames = Arc::clone(&surface.frames);
        let draws = Arc::clone(&surface.draws);

        let mut driver = LoopDriver::new(seeded());
        driver.start(screen(), surface, |_score: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(driver.is_running());
        driver.stop();

        assert!(frames.load(Ordering::SeqCst) >= 2);
        assert_eq!(draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_restart_resumes_parked_session() {
        let config = GameConfig {
            gravity: 5000.0,
            ..seeded()
        };
        let mut driver = LoopDriver::new(config);
        driver.start(screen(), CountingSurface::default(), |_score: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(60));
        driver.stop();
        assert!(driver.paused_session().unwrap().run.is_over());

        driver.start(screen(), CountingSurface::default(), |_score: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(60));
        driver.stop();
        // No tap, so still over
        assert!(driver.paused_session().unwrap().run.is_over());
    }

    #[test]
    fn test_resize_while_stopped_updates_parked_session() {
        let mut driver = LoopDriver::new(seeded());
        driver.start(screen(), CountingSurface::default(), |_score: u32| {}).unwrap();
        driver.stop();

        driver.resize(Screen::new(720.0, 1280.0)).unwrap();
        assert_eq!(driver.paused_session().unwrap().screen, Screen::new(720.0, 1280.0));
        assert!(driver.resize(Screen::new(720.0, 500.0)).is_err());
    }

    struct PanickingSurface;

    impl Surface for PanickingSurface {
        fn begin_frame(&mut self) -> Result<(), SurfaceError> {
            panic!("surface torn down under the loop");
        }

        fn draw(&mut self, _command: &DrawCommand) {}

        fn end_frame(&mut self) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    #[test]
    fn test_commands_to_dead_loop_are_dropped() {
        let mut driver = LoopDriver::new(seeded());
        driver.start(screen(), PanickingSurface, |_score: u32| {}).unwrap();
        thread::sleep(Duration::from_millis(50));

        // Thread is gone; sends fail without surfacing to the caller
        driver.jump();
        assert!(driver.resize(Screen::new(720.0, 1280.0)).is_ok());

        driver.stop();
        assert!(driver.paused_session().is_none());
    }

    #[test]
    fn test_stop_when_stopped_is_noop() {
        let mut driver = LoopDriver::new(seeded());
        driver.stop();
        driver.jump();
        assert!(!driver.is_running());
        assert!(driver.paused_session().is_none());
    }
}
