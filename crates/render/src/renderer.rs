use glam::{Mat4, Vec2};
use playfield_assets::{Texture, TiledMap};
use playfield_common::{Color, DebugShape, ReleaseError};

/// The frame buffer the host presents.
pub trait Surface {
    fn clear(&mut self, color: Color);
}

/// Batched sprite and text drawing, owned by the host.
///
/// Draw calls are only valid between [`begin`](Self::begin) and [`end`](Self::end).
pub trait SpriteBatch {
    fn set_projection(&mut self, projection: Mat4);
    fn begin(&mut self);
    /// Draw `texture` with its lower-left corner at `position`, stretched to `size`.
    fn draw(&mut self, texture: &Texture, position: Vec2, size: Vec2);
    /// Draw one line of text with the host's default font.
    fn draw_text(&mut self, text: &str, position: Vec2);
    fn end(&mut self);
}

/// Draws an orthogonal tile map through a camera.
pub trait TileMapRenderer {
    fn set_view(&mut self, projection: Mat4);
    fn render(&mut self, map: &TiledMap);
    fn release(&mut self) -> Result<(), ReleaseError>;
}

/// Wireframe overlay of physics colliders.
pub trait DebugRenderer {
    /// `projection` expects coordinates in meters.
    fn render(&mut self, shapes: &[DebugShape], projection: Mat4);
    fn release(&mut self) -> Result<(), ReleaseError>;
}
