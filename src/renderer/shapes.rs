//! Draw-command generation from a session snapshot

use glam::Vec2;

use crate::sim::{Rect, Session};

/// RGBA, 0.0 - 1.0
pub type Color = [f32; 4];

pub const BACKGROUND: Color = [1.0, 1.0, 1.0, 1.0];
pub const PIPE: Color = [0.0, 1.0, 0.0, 1.0];
pub const TEXT: Color = [0.0, 0.0, 1.0, 1.0];

pub const SCORE_TEXT_SIZE: f32 = 60.0;
pub const TITLE_TEXT_SIZE: f32 = 100.0;

/// One drawing primitive for the host surface
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface
    Clear(Color),
    /// The avatar sprite stretched over `rect`
    Sprite { rect: Rect },
    FillRect { rect: Rect, color: Color },
    /// Text with its baseline starting at `pos`
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
    },
}

/// Everything needed to draw one frame, back to front
pub fn draw_list(session: &Session) -> Vec<DrawCommand> {
    let run = &session.run;
    let mut commands = Vec::with_capacity(4 + run.obstacles.len() * 2);

    commands.push(DrawCommand::Clear(BACKGROUND));
    commands.push(DrawCommand::Sprite {
        rect: session.avatar.bounds(),
    });

    for pair in &run.obstacles {
        commands.push(DrawCommand::FillRect {
            rect: pair.top,
            color: PIPE,
        });
        commands.push(DrawCommand::FillRect {
            rect: pair.bottom,
            color: PIPE,
        });
    }

    commands.push(DrawCommand::Text {
        text: format!("Score: {}", run.score),
        pos: Vec2::new(50.0, 100.0),
        size: SCORE_TEXT_SIZE,
        color: TEXT,
    });

    if run.is_over() {
        let screen = session.screen;
        commands.push(DrawCommand::Text {
            text: "Game Over".to_string(),
            pos: Vec2::new(screen.width / 4.0, screen.height / 2.0),
            size: TITLE_TEXT_SIZE,
            color: TEXT,
        });
        commands.push(DrawCommand::Text {
            text: "Tap to restart".to_string(),
            pos: Vec2::new(screen.width / 3.0, screen.height / 2.0 + 80.0),
            size: SCORE_TEXT_SIZE,
            color: TEXT,
        });
    }

    commands
}
