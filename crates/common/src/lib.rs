//! Shared types for the playfield: units, body handles, debug shapes, configuration.
//!
//! # Invariants
//! - Pixel and physics (meter) units only meet through [`PixelsPerMeter`].
//! - Handles are opaque; only the physics world that issued one can resolve it.

pub mod config;
pub mod types;

pub use config::{
    AssetPaths, CameraConfig, ConfigError, FollowMode, GroundConfig, PlayConfig, PlayerConfig,
    StepMode, ViewportConfig,
};
pub use types::{BodyHandle, BodyKind, Color, DebugShape, PixelsPerMeter, ReleaseError};

pub fn crate_info() -> &'static str {
    "playfield-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
