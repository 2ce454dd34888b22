use playfield_assets::AssetError;
use playfield_common::ReleaseError;
use playfield_render::{SpriteBatch, Surface};

/// Host-owned drawing targets lent to a screen for one frame.
pub struct FrameContext<'a> {
    pub surface: &'a mut dyn Surface,
    pub batch: &'a mut dyn SpriteBatch,
}

/// Errors from screen operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("screen has not been shown")]
    NotShown,
    #[error("screen has been disposed")]
    Disposed,
    #[error(transparent)]
    MissingAsset(#[from] AssetError),
    #[error(transparent)]
    Teardown(#[from] TeardownError),
}

/// Every release that failed during teardown. The others still ran.
#[derive(Debug, thiserror::Error)]
#[error("teardown finished with {} failed release(s)", .failures.len())]
pub struct TeardownError {
    pub failures: Vec<ReleaseError>,
}

/// Lifecycle contract between a host game loop and one screen.
///
/// The host calls `render` once per display frame, on one thread.
pub trait Screen {
    /// Acquire resources. Called when the screen becomes current.
    fn show(&mut self) -> Result<(), ScreenError>;

    /// Advance and draw one display frame. `delta` is the host's frame time in seconds.
    fn render(&mut self, delta: f32, frame: &mut FrameContext<'_>) -> Result<(), ScreenError>;

    fn resize(&mut self, width: u32, height: u32);

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn hide(&mut self) {}

    /// Release every resource, reporting all failures together.
    fn dispose(&mut self) -> Result<(), ScreenError>;
}
