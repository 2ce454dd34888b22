//! Physics World: the rigid-body capability the play screen steps each tick.
//!
//! # Invariants
//! - Positions and extents crossing this boundary are in meters.
//! - Pixel-space geometry is converted once, in [`create_box`].
//! - Only the screen's simulation step mutates the world.

mod rapier;
mod world;

pub use rapier::RapierWorld;
pub use world::{BoxDef, PhysicsWorld, create_box};

pub fn crate_info() -> &'static str {
    "playfield-physics v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("physics"));
    }
}
