use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Scale factor between pixel coordinates and physics-simulation meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelsPerMeter(pub f32);

impl PixelsPerMeter {
    pub fn to_meters(self, pixels: f32) -> f32 {
        pixels / self.0
    }

    pub fn to_pixels(self, meters: f32) -> f32 {
        meters * self.0
    }

    pub fn vec_to_meters(self, pixels: Vec2) -> Vec2 {
        pixels / self.0
    }

    pub fn vec_to_pixels(self, meters: Vec2) -> Vec2 {
        meters * self.0
    }
}

impl Default for PixelsPerMeter {
    fn default() -> Self {
        Self(32.0)
    }
}

/// Whether a body is moved by the simulation or stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Opaque reference to a body owned by a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// One box collider as seen by the debug wireframe overlay, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugShape {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub kind: BodyKind,
}

/// Linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Color = Color([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Color = Color([0.0, 0.0, 0.0, 1.0]);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A resource refused to release.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to release {resource}: {reason}")]
pub struct ReleaseError {
    pub resource: String,
    pub reason: String,
}

impl ReleaseError {
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_converts_both_ways() {
        let ppm = PixelsPerMeter(32.0);
        assert_eq!(ppm.to_meters(64.0), 2.0);
        assert_eq!(ppm.to_pixels(2.0), 64.0);
        assert_eq!(ppm.vec_to_meters(Vec2::new(16.0, 48.0)), Vec2::new(0.5, 1.5));
    }

    #[test]
    fn release_error_display() {
        let e = ReleaseError::new("physics world", "already released");
        assert_eq!(
            e.to_string(),
            "failed to release physics world: already released"
        );
    }

    #[test]
    fn default_color_is_white() {
        assert_eq!(Color::default(), Color::WHITE);
    }
}
