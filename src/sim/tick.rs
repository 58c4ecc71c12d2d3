//! Fixed-step simulation tick
//!
//! One call advances the session by exactly one frame. Physics constants are
//! per tick, so there is no frame delta: the elapsed time between frames is
//! not used, and the wall clock (`now_ms`) only matters for spawn timing.

use super::spawn::spawn;
use super::state::{GameEvent, GamePhase, Session};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Tap: jump while playing, restart once the run is over
    pub jump: bool,
}

/// Advance the session by one frame.
///
/// Order: gravity/jump, spawn, scroll, score, prune, collide. Nothing moves
/// once the run is over; a jump then restarts the run instead.
pub fn tick(session: &mut Session, input: &TickInput, now_ms: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if session.run.is_over() {
        if input.jump {
            reset(session, now_ms);
        }
        return events;
    }

    let config = &session.config;
    let screen = session.screen;
    let avatar = &mut session.avatar;
    let run = &mut session.run;

    // A jump replaces the velocity outright
    avatar.vel_y = if input.jump {
        config.jump_impulse
    } else {
        avatar.vel_y + config.gravity
    };
    avatar.pos.y += avatar.vel_y;

    if now_ms.saturating_sub(run.last_spawn_ms) > config.spawn_interval_ms {
        let id = run.next_entity_id();
        let pair = spawn(
            &mut session.rng,
            id,
            screen,
            config.pipe_gap,
            config.pipe_width,
            config.min_margin,
        );
        run.obstacles.push(pair);
        run.last_spawn_ms = now_ms;
        events.push(GameEvent::Spawned { id });
    }

    for pair in &mut run.obstacles {
        pair.scroll(-config.pipe_speed);
    }

    let avatar_x = avatar.pos.x;
    for pair in run.obstacles.iter_mut() {
        if !pair.scored && pair.right() < avatar_x {
            pair.scored = true;
            run.score += 1;
            events.push(GameEvent::Scored { score: run.score });
        }
    }

    // Off-screen gates are gone; their points stay
    run.obstacles.retain(|pair| pair.right() >= 0.0);

    let hitbox = avatar.hitbox(config.hitbox_inset);
    let hit_obstacle = run.obstacles.iter().any(|pair| pair.collides(&hitbox));
    let out_of_bounds = avatar.pos.y < 0.0 || avatar.bounds().bottom > screen.height;

    if hit_obstacle || out_of_bounds {
        run.phase = GamePhase::GameOver;
        log::info!(
            "Run over ({}), score {}",
            if hit_obstacle { "collision" } else { "out of bounds" },
            run.score
        );
        events.push(GameEvent::RunEnded { score: run.score });
    }

    events
}

/// Start a fresh run: avatar recentred and at rest, no obstacles, score 0,
/// spawn timer restarted at `now_ms`. Calling it twice equals calling it once.
pub fn reset(session: &mut Session, now_ms: u64) {
    session.reset(now_ms);
}
