//! Play screen: owns the physics world, the player and the cameras for one level.
//!
//! # Invariants
//! - Simulation steps happen only inside `render`, as planned by the frame driver.
//! - Drawing uses the last committed step; it never advances the simulation.
//! - Resources acquired on `show` are released exactly once, on `dispose`.

mod entity;
mod play;
mod screen;

pub use entity::{Entity, Player};
pub use play::{Capabilities, PlayScreen};
pub use screen::{FrameContext, Screen, ScreenError, TeardownError};

pub fn crate_info() -> &'static str {
    "playfield-screen v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("screen"));
    }
}
