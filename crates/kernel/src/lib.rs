//! Frame Driver: turns display-frame timestamps into fixed simulation steps.
//!
//! # Invariants
//! - Step count is decoupled from frame count; rendering always uses the last committed step.
//! - A step only runs once a full interval of clock time is owed.
//! - Time comes from an injected [`Clock`], never from a global.

pub mod clock;
pub mod driver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{FrameDriver, FramePlan, StepPolicy};

pub fn crate_info() -> &'static str {
    "playfield-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
