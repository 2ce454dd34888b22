use glam::Vec2;
use playfield_common::{BodyHandle, BodyKind, DebugShape, PixelsPerMeter, ReleaseError};

/// Body definition in physics units: one box collider per body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDef {
    /// Centre position, in meters.
    pub position: Vec2,
    /// Half width and half height, in meters.
    pub half_extents: Vec2,
    pub kind: BodyKind,
    pub fixed_rotation: bool,
    pub density: f32,
}

impl BoxDef {
    /// Convert a pixel-space box (centre and full size) into physics units.
    pub fn from_pixels(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        kind: BodyKind,
        ppm: PixelsPerMeter,
    ) -> Self {
        Self {
            position: Vec2::new(ppm.to_meters(x), ppm.to_meters(y)),
            half_extents: Vec2::new(ppm.to_meters(width / 2.0), ppm.to_meters(height / 2.0)),
            kind,
            fixed_rotation: true,
            density: 1.0,
        }
    }
}

/// Rigid-body simulation the screen delegates to.
///
/// Implementations own every body they create; handles are only meaningful
/// to the world that issued them.
pub trait PhysicsWorld {
    fn create_body(&mut self, def: &BoxDef) -> BodyHandle;

    /// Advance by `dt` seconds with the given solver iteration counts.
    fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize);

    fn body_position(&self, body: BodyHandle) -> Option<Vec2>;

    fn body_half_extents(&self, body: BodyHandle) -> Option<Vec2>;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2);

    fn body_count(&self) -> usize;

    /// Every collider, for the wireframe overlay.
    fn debug_shapes(&self) -> Vec<DebugShape>;

    /// Drop all bodies. A world can be released once.
    fn release(&mut self) -> Result<(), ReleaseError>;
}

/// Create a box body from pixel-space geometry.
///
/// Dimensions are not validated.
pub fn create_box(
    world: &mut dyn PhysicsWorld,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    kind: BodyKind,
    ppm: PixelsPerMeter,
) -> BodyHandle {
    let def = BoxDef::from_pixels(x, y, width, height, kind, ppm);
    let handle = world.create_body(&def);
    tracing::debug!(
        ?handle,
        ?kind,
        x = def.position.x,
        y = def.position.y,
        "created box body"
    );
    handle
}
