//! Capability implementations that record every call instead of drawing.
//!
//! All recorders created from the same [`DrawLog`] append to it in call
//! order, so a test (or the headless CLI) can check the exact sequence a
//! frame produced.

use crate::renderer::{DebugRenderer, SpriteBatch, Surface, TileMapRenderer};
use glam::{Mat4, Vec2};
use playfield_assets::{Texture, TextureId, TiledMap};
use playfield_common::{Color, DebugShape, ReleaseError};
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    MapView(Mat4),
    Map { name: String, tiles: usize },
    Projection(Mat4),
    Begin,
    Sprite {
        texture: TextureId,
        position: Vec2,
        size: Vec2,
    },
    Text { text: String, position: Vec2 },
    End,
    DebugShapes { count: usize, projection: Mat4 },
}

/// Shared, append-only list of drawing calls.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: DrawCommand) {
        self.commands.borrow_mut().push(command);
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }

    /// Human-readable listing, one call per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for command in self.commands.borrow().iter() {
            let line = match command {
                DrawCommand::Clear(c) => format!(
                    "clear ({:.2}, {:.2}, {:.2}, {:.2})",
                    c.0[0], c.0[1], c.0[2], c.0[3]
                ),
                DrawCommand::MapView(_) => "map view".to_string(),
                DrawCommand::Map { name, tiles } => format!("map {name} ({tiles} tiles)"),
                DrawCommand::Projection(_) => "projection".to_string(),
                DrawCommand::Begin => "begin".to_string(),
                DrawCommand::Sprite {
                    texture,
                    position,
                    size,
                } => format!(
                    "  sprite [{:016x}] at ({:.2}, {:.2}) size ({:.0}, {:.0})",
                    texture.0, position.x, position.y, size.x, size.y
                ),
                DrawCommand::Text { text, position } => {
                    format!("  text {text:?} at ({:.0}, {:.0})", position.x, position.y)
                }
                DrawCommand::End => "end".to_string(),
                DrawCommand::DebugShapes { count, .. } => format!("debug shapes ({count})"),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    log: DrawLog,
}

impl RecordingSurface {
    pub fn new(log: DrawLog) -> Self {
        Self { log }
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.log.push(DrawCommand::Clear(color));
    }
}

#[derive(Debug, Clone)]
pub struct RecordingBatch {
    log: DrawLog,
    drawing: bool,
}

impl RecordingBatch {
    pub fn new(log: DrawLog) -> Self {
        Self {
            log,
            drawing: false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }
}

impl SpriteBatch for RecordingBatch {
    fn set_projection(&mut self, projection: Mat4) {
        self.log.push(DrawCommand::Projection(projection));
    }

    fn begin(&mut self) {
        if self.drawing {
            tracing::warn!("sprite batch begin while already drawing");
        }
        self.drawing = true;
        self.log.push(DrawCommand::Begin);
    }

    fn draw(&mut self, texture: &Texture, position: Vec2, size: Vec2) {
        if !self.drawing {
            tracing::warn!("sprite drawn outside begin/end");
        }
        self.log.push(DrawCommand::Sprite {
            texture: texture.id,
            position,
            size,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2) {
        if !self.drawing {
            tracing::warn!("text drawn outside begin/end");
        }
        self.log.push(DrawCommand::Text {
            text: text.to_string(),
            position,
        });
    }

    fn end(&mut self) {
        self.drawing = false;
        self.log.push(DrawCommand::End);
    }
}

/// Outcome of a recorder's `release`.
#[derive(Debug, Clone, Default)]
struct ReleaseState {
    released: bool,
    fail_with: Option<String>,
}

impl ReleaseState {
    fn release(&mut self, resource: &str) -> Result<(), ReleaseError> {
        if self.released {
            return Err(ReleaseError::new(resource, "already released"));
        }
        self.released = true;
        match &self.fail_with {
            Some(reason) => Err(ReleaseError::new(resource, reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordingMapRenderer {
    log: DrawLog,
    release: ReleaseState,
}

impl RecordingMapRenderer {
    pub fn new(log: DrawLog) -> Self {
        Self {
            log,
            release: ReleaseState::default(),
        }
    }

    /// Make [`TileMapRenderer::release`] fail with `reason`.
    pub fn failing_release(mut self, reason: impl Into<String>) -> Self {
        self.release.fail_with = Some(reason.into());
        self
    }
}

impl TileMapRenderer for RecordingMapRenderer {
    fn set_view(&mut self, projection: Mat4) {
        self.log.push(DrawCommand::MapView(projection));
    }

    fn render(&mut self, map: &TiledMap) {
        self.log.push(DrawCommand::Map {
            name: map.name.clone(),
            tiles: map.occupied_tiles(),
        });
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        self.release.release("tile map renderer")
    }
}

#[derive(Debug, Clone)]
pub struct RecordingDebugRenderer {
    log: DrawLog,
    release: ReleaseState,
}

impl RecordingDebugRenderer {
    pub fn new(log: DrawLog) -> Self {
        Self {
            log,
            release: ReleaseState::default(),
        }
    }

    /// Make [`DebugRenderer::release`] fail with `reason`.
    pub fn failing_release(mut self, reason: impl Into<String>) -> Self {
        self.release.fail_with = Some(reason.into());
        self
    }
}

impl DebugRenderer for RecordingDebugRenderer {
    fn render(&mut self, shapes: &[DebugShape], projection: Mat4) {
        self.log.push(DrawCommand::DebugShapes {
            count: shapes.len(),
            projection,
        });
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        self.release.release("debug renderer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playfield_assets::TiledMap;

    #[test]
    fn recorders_share_one_log() {
        let log = DrawLog::new();
        let mut surface = RecordingSurface::new(log.clone());
        let mut batch = RecordingBatch::new(log.clone());
        let mut map = RecordingMapRenderer::new(log.clone());

        surface.clear(Color::WHITE);
        map.render(&TiledMap::filled("m", 2, 2, 16, 1));
        batch.begin();
        batch.draw_text("hi", Vec2::new(20.0, 40.0));
        batch.end();

        assert_eq!(
            log.commands(),
            vec![
                DrawCommand::Clear(Color::WHITE),
                DrawCommand::Map {
                    name: "m".into(),
                    tiles: 4
                },
                DrawCommand::Begin,
                DrawCommand::Text {
                    text: "hi".into(),
                    position: Vec2::new(20.0, 40.0)
                },
                DrawCommand::End,
            ]
        );
        assert!(!batch.is_drawing());
    }

    #[test]
    fn to_text_lists_calls() {
        let log = DrawLog::new();
        let mut debug = RecordingDebugRenderer::new(log.clone());
        debug.render(&[], Mat4::IDENTITY);
        let mut batch = RecordingBatch::new(log.clone());
        batch.begin();
        batch.draw_text("Screen: Play", Vec2::new(20.0, 40.0));
        batch.end();

        let text = log.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "debug shapes (0)",
                "begin",
                "  text \"Screen: Play\" at (20, 40)",
                "end",
            ]
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn release_once_then_fail() {
        let mut map = RecordingMapRenderer::new(DrawLog::new());
        assert!(map.release().is_ok());
        let err = map.release().unwrap_err();
        assert_eq!(err.reason, "already released");
    }

    #[test]
    fn failing_release_reports_reason() {
        let mut debug = RecordingDebugRenderer::new(DrawLog::new()).failing_release("gpu lost");
        let err = debug.release().unwrap_err();
        assert_eq!(err.resource, "debug renderer");
        assert_eq!(err.reason, "gpu lost");
    }

    #[test]
    fn clear_empties_log() {
        let log = DrawLog::new();
        RecordingSurface::new(log.clone()).clear(Color::BLACK);
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
