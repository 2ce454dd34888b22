//! Rendering Adapter: cameras plus the drawing capabilities a screen is handed.
//!
//! # Invariants
//! - Drawing never mutates simulation state.
//! - Cameras are plain data; only the screen's simulation step moves the world camera.
//!
//! The capabilities are traits so a screen can run against a real backend or
//! against the recording implementations in [`recording`], which log every
//! call into a shared [`DrawLog`].

mod camera;
pub mod recording;
mod renderer;

pub use camera::{CameraFollow, OrthoCamera};
pub use recording::{
    DrawCommand, DrawLog, RecordingBatch, RecordingDebugRenderer, RecordingMapRenderer,
    RecordingSurface,
};
pub use renderer::{DebugRenderer, SpriteBatch, Surface, TileMapRenderer};

pub fn crate_info() -> &'static str {
    "playfield-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
