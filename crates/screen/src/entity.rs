use glam::Vec2;
use playfield_assets::Texture;
use playfield_common::{BodyHandle, PixelsPerMeter};
use playfield_physics::PhysicsWorld;
use playfield_render::SpriteBatch;

/// Something the screen steps and draws.
pub trait Entity {
    /// Centre position in meters.
    fn position(&self) -> Vec2;

    /// Size in pixels.
    fn size(&self) -> Vec2;

    fn update(&mut self, dt: f32, physics: &dyn PhysicsWorld);

    /// Draw with the batch projection already set by the caller.
    fn render(&self, batch: &mut dyn SpriteBatch, ppm: PixelsPerMeter);
}

/// The player: a sprite riding on a dynamic physics body.
#[derive(Debug, Clone)]
pub struct Player {
    body: BodyHandle,
    position: Vec2,
    size: Vec2,
    texture: Texture,
}

impl Player {
    pub fn new(body: BodyHandle, physics: &dyn PhysicsWorld, size: Vec2, texture: Texture) -> Self {
        Self {
            body,
            position: physics.body_position(body).unwrap_or(Vec2::ZERO),
            size,
            texture,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

impl Entity for Player {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn update(&mut self, _dt: f32, physics: &dyn PhysicsWorld) {
        match physics.body_position(self.body) {
            Some(position) => self.position = position,
            None => tracing::warn!(body = ?self.body, "player body missing from physics world"),
        }
    }

    fn render(&self, batch: &mut dyn SpriteBatch, ppm: PixelsPerMeter) {
        let corner = ppm.vec_to_pixels(self.position) - self.size / 2.0;
        batch.begin();
        batch.draw(&self.texture, corner, self.size);
        batch.end();
    }
}
