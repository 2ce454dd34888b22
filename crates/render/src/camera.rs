use glam::{Mat4, Vec2, Vec3};
use playfield_common::{CameraConfig, FollowMode, PixelsPerMeter};

/// Orthographic 2D camera in pixel units, centred on `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    position: Vec2,
    viewport: Vec2,
    zoom: f32,
}

impl OrthoCamera {
    /// A camera showing `width` x `height` pixels with its origin at the lower-left corner.
    pub fn new(width: f32, height: f32) -> Self {
        let mut cam = Self {
            position: Vec2::ZERO,
            viewport: Vec2::ONE,
            zoom: 1.0,
        };
        cam.set_to_ortho(width, height);
        cam
    }

    /// Resize the viewport and re-centre so (0, 0) is the lower-left corner.
    pub fn set_to_ortho(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.position = self.viewport * self.zoom / 2.0;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn projection(&self) -> Mat4 {
        let half = self.viewport * self.zoom / 2.0;
        Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0))
    }

    /// Combined view-projection matrix.
    pub fn combined(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Combined matrix for geometry given in meters.
    pub fn scaled(&self, ppm: PixelsPerMeter) -> Mat4 {
        self.combined() * Mat4::from_scale(Vec3::new(ppm.0, ppm.0, 1.0))
    }

    /// Normalised device coordinates of a world-space pixel position.
    pub fn project(&self, world: Vec2) -> Vec2 {
        self.combined().project_point3(world.extend(0.0)).truncate()
    }
}

/// Computes where the world camera should look to keep an entity in frame.
///
/// The target places the entity toward the lower-left of the viewport:
///
/// ```text
/// x = pos.x * ppm * position_scale + (viewport.w * margin_x - size.w / 2)
/// y = pos.y * ppm * position_scale - (viewport.h * margin_y - size.h)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFollow {
    pub mode: FollowMode,
    pub margin_x: f32,
    pub margin_y: f32,
    pub position_scale: f32,
}

impl CameraFollow {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            mode: config.mode,
            margin_x: config.margin_x,
            margin_y: config.margin_y,
            position_scale: config.position_scale,
        }
    }

    /// Follow target for an entity at `position` (meters) of `size` (pixels).
    pub fn target(&self, position: Vec2, size: Vec2, viewport: Vec2, ppm: PixelsPerMeter) -> Vec2 {
        let scaled = ppm.vec_to_pixels(position) * self.position_scale;
        Vec2::new(
            scaled.x + (viewport.x * self.margin_x - size.x / 2.0),
            scaled.y - (viewport.y * self.margin_y - size.y),
        )
    }

    /// Move `camera` according to the follow mode.
    ///
    /// [`FollowMode::Translate`] adds `target` to the position, so repeated
    /// calls keep moving the camera even when the entity is still.
    pub fn apply(&self, camera: &mut OrthoCamera, target: Vec2, dt: f32) {
        match self.mode {
            FollowMode::Set => camera.set_position(target),
            FollowMode::Translate => camera.translate(target),
            FollowMode::Lerp { rate } => {
                let t = (rate * dt).clamp(0.0, 1.0);
                let current = camera.position();
                camera.set_position(current + (target - current) * t);
            }
        }
    }

    /// [`target`](Self::target) followed by [`apply`](Self::apply).
    pub fn follow(
        &self,
        camera: &mut OrthoCamera,
        position: Vec2,
        size: Vec2,
        ppm: PixelsPerMeter,
        dt: f32,
    ) {
        let target = self.target(position, size, camera.viewport(), ppm);
        self.apply(camera, target, dt);
    }
}

impl Default for CameraFollow {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PPM: PixelsPerMeter = PixelsPerMeter(32.0);

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn set_to_ortho_centres_camera() {
        let cam = OrthoCamera::new(640.0, 360.0);
        assert_eq!(cam.position(), Vec2::new(320.0, 180.0));
        assert_eq!(cam.viewport(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn combined_maps_viewport_to_clip_space() {
        let cam = OrthoCamera::new(640.0, 360.0);
        assert!(close(cam.project(Vec2::new(320.0, 180.0)), Vec2::ZERO));
        assert!(close(cam.project(Vec2::new(640.0, 360.0)), Vec2::ONE));
        assert!(close(cam.project(Vec2::ZERO), Vec2::new(-1.0, -1.0)));
    }

    #[test]
    fn scaled_matrix_takes_meters() {
        let cam = OrthoCamera::new(640.0, 360.0);
        let ndc = cam
            .scaled(PPM)
            .project_point3(Vec3::new(10.0, 5.625, 0.0))
            .truncate();
        assert!(close(ndc, Vec2::ZERO));
    }

    #[test]
    fn target_offsets_toward_lower_left() {
        let follow = CameraFollow::default();
        let target = follow.target(
            Vec2::new(10.0, 5.0),
            Vec2::new(16.0, 16.0),
            Vec2::new(640.0, 360.0),
            PPM,
        );
        // x: 10*32/2 + (80 - 8), y: 5*32/2 - (45 - 16)
        assert!(close(target, Vec2::new(232.0, 51.0)));
    }

    #[test]
    fn translate_mode_compounds() {
        let follow = CameraFollow {
            mode: FollowMode::Translate,
            ..CameraFollow::default()
        };
        let start = OrthoCamera::new(640.0, 360.0);
        let pos = Vec2::new(10.0, 5.0);
        let size = Vec2::new(16.0, 16.0);

        let mut once = start;
        follow.follow(&mut once, pos, size, PPM, 1.0 / 60.0);
        let mut twice = start;
        follow.follow(&mut twice, pos, size, PPM, 1.0 / 60.0);
        follow.follow(&mut twice, pos, size, PPM, 1.0 / 60.0);

        let moved_once = once.position() - start.position();
        let moved_twice = twice.position() - start.position();
        assert!(close(moved_twice, moved_once * 2.0));
    }

    #[test]
    fn set_mode_is_idempotent() {
        let follow = CameraFollow::default();
        let mut cam = OrthoCamera::new(640.0, 360.0);
        let pos = Vec2::new(10.0, 5.0);
        let size = Vec2::new(16.0, 16.0);

        follow.follow(&mut cam, pos, size, PPM, 1.0 / 60.0);
        let first = cam.position();
        follow.follow(&mut cam, pos, size, PPM, 1.0 / 60.0);
        assert_eq!(cam.position(), first);
        assert_eq!(first, follow.target(pos, size, cam.viewport(), PPM));
    }

    #[test]
    fn lerp_mode_moves_part_way() {
        let follow = CameraFollow {
            mode: FollowMode::Lerp { rate: 30.0 },
            ..CameraFollow::default()
        };
        let mut cam = OrthoCamera::new(640.0, 360.0);
        cam.set_position(Vec2::ZERO);
        follow.apply(&mut cam, Vec2::new(100.0, 0.0), 1.0 / 60.0);
        assert!(close(cam.position(), Vec2::new(50.0, 0.0)));

        // A large dt never overshoots.
        follow.apply(&mut cam, Vec2::new(100.0, 0.0), 10.0);
        assert!(close(cam.position(), Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn zoom_widens_projection() {
        let mut cam = OrthoCamera::new(640.0, 360.0);
        cam.set_zoom(2.0);
        cam.set_to_ortho(640.0, 360.0);
        assert_eq!(cam.position(), Vec2::new(640.0, 360.0));
        assert!(close(cam.project(Vec2::new(1280.0, 720.0)), Vec2::ONE));
    }
}
