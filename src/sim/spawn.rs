//! Obstacle generation

use rand::Rng;

use super::geometry::Rect;
use super::state::{ObstaclePair, Screen};

/// Build a gate just off the right edge of the screen.
///
/// The top rect's height is drawn uniformly from
/// `[min_margin, screen.height - gap - min_margin)`. The range must be
/// non-empty; `GameConfig::validate` guarantees that before any spawn.
pub fn spawn<R: Rng>(
    rng: &mut R,
    id: u32,
    screen: Screen,
    gap: f32,
    pipe_width: f32,
    min_margin: f32,
) -> ObstaclePair {
    let max_height = screen.height - gap - min_margin;
    let top_height = rng.random_range(min_margin..max_height);

    let left = screen.width;
    let right = screen.width + pipe_width;
    let top = Rect::new(left, 0.0, right, top_height);
    let bottom = Rect::new(left, top_height + gap, right, screen.height);

    log::debug!("Spawned obstacle {id}: gap at {top_height:.0}..{:.0}", top_height + gap);
    ObstaclePair::new(id, top, bottom)
}
