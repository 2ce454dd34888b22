use crate::entity::{Entity, Player};
use crate::screen::{FrameContext, Screen, ScreenError, TeardownError};
use glam::Vec2;
use playfield_assets::{AssetCache, AssetKind, Texture, TiledMap};
use playfield_common::{BodyHandle, BodyKind, PlayConfig, ReleaseError};
use playfield_kernel::{Clock, FrameDriver, StepPolicy};
use playfield_physics::{PhysicsWorld, create_box};
use playfield_render::{CameraFollow, DebugRenderer, OrthoCamera, TileMapRenderer};
use std::rc::Rc;

/// Collaborators injected into a [`PlayScreen`].
pub struct Capabilities {
    pub physics: Box<dyn PhysicsWorld>,
    pub map_renderer: Box<dyn TileMapRenderer>,
    pub debug_renderer: Box<dyn DebugRenderer>,
    pub clock: Box<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Shown,
    Disposed,
}

/// Everything acquired on `show`.
struct Stage {
    map: TiledMap,
    hud: Texture,
    player: Player,
    ground: BodyHandle,
    /// Asset paths holding one reference each.
    acquired: Vec<String>,
}

/// The level screen: tile map, player on a physics body, following camera, HUD.
pub struct PlayScreen {
    config: PlayConfig,
    assets: Rc<AssetCache>,
    physics: Box<dyn PhysicsWorld>,
    map_renderer: Box<dyn TileMapRenderer>,
    debug_renderer: Box<dyn DebugRenderer>,
    clock: Box<dyn Clock>,
    driver: FrameDriver,
    camera: OrthoCamera,
    hud_camera: OrthoCamera,
    follow: CameraFollow,
    debug: bool,
    lifecycle: Lifecycle,
    stage: Option<Stage>,
}

impl PlayScreen {
    pub fn new(config: PlayConfig, assets: Rc<AssetCache>, caps: Capabilities) -> Self {
        let viewport = config.viewport;
        let policy = StepPolicy::from_mode(config.step_mode, config.max_catch_up_steps);
        Self {
            driver: FrameDriver::from_rate(config.target_ups, policy),
            camera: OrthoCamera::new(viewport.width, viewport.height),
            hud_camera: OrthoCamera::new(viewport.width, viewport.height),
            follow: CameraFollow::from_config(&config.camera),
            debug: config.debug_draw,
            lifecycle: Lifecycle::Created,
            stage: None,
            physics: caps.physics,
            map_renderer: caps.map_renderer,
            debug_renderer: caps.debug_renderer,
            clock: caps.clock,
            assets,
            config,
        }
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    /// The player, once the screen has been shown.
    pub fn player(&self) -> Option<&Player> {
        self.stage.as_ref().map(|s| &s.player)
    }

    pub fn ground(&self) -> Option<BodyHandle> {
        self.stage.as_ref().map(|s| s.ground)
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn hud_camera(&self) -> &OrthoCamera {
        &self.hud_camera
    }

    pub fn physics(&self) -> &dyn PhysicsWorld {
        self.physics.as_ref()
    }

    pub fn physics_mut(&mut self) -> &mut dyn PhysicsWorld {
        self.physics.as_mut()
    }

    /// Simulation steps run so far.
    pub fn steps_taken(&self) -> u64 {
        self.driver.total_steps()
    }

    pub fn debug_draw(&self) -> bool {
        self.debug
    }

    pub fn set_debug_draw(&mut self, on: bool) {
        self.debug = on;
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    fn acquire<T: AssetKind>(&self, path: &str, acquired: &mut Vec<String>) -> Result<T, ScreenError> {
        match self.assets.get::<T>(path) {
            Ok(asset) => {
                acquired.push(path.to_string());
                Ok(asset)
            }
            Err(e) => {
                for held in acquired.drain(..) {
                    if let Err(release) = self.assets.release(&held) {
                        tracing::warn!(path = %held, "release after failed show: {release}");
                    }
                }
                Err(e.into())
            }
        }
    }

    /// One fixed simulation step: physics, then entities, then the camera.
    fn step(&mut self, dt: f32) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let _span = tracing::debug_span!("sim_step", tick = self.driver.total_steps()).entered();

        self.physics.step(
            dt,
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
        stage.player.update(dt, self.physics.as_ref());
        self.follow.follow(
            &mut self.camera,
            stage.player.position(),
            stage.player.size(),
            self.config.ppm,
            dt,
        );
        tracing::trace!(
            x = stage.player.position().x,
            y = stage.player.position().y,
            "step complete"
        );
    }

    fn draw(&mut self, frame: &mut FrameContext<'_>) {
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        frame.surface.clear(self.config.clear_color);

        let combined = self.camera.combined();
        self.map_renderer.set_view(combined);
        self.map_renderer.render(&stage.map);

        frame.batch.set_projection(combined);
        stage.player.render(&mut *frame.batch, self.config.ppm);

        if self.debug {
            let shapes = self.physics.debug_shapes();
            self.debug_renderer
                .render(&shapes, self.camera.scaled(self.config.ppm));
        }

        frame.batch.set_projection(self.hud_camera.combined());
        frame.batch.begin();
        let hud_size = Vec2::new(stage.hud.width as f32, stage.hud.height as f32);
        frame.batch.draw(&stage.hud, Vec2::ZERO, hud_size);
        frame
            .batch
            .draw_text(&self.config.hud_label, Vec2::new(20.0, 40.0));
        frame.batch.end();
    }
}

impl Screen for PlayScreen {
    fn show(&mut self) -> Result<(), ScreenError> {
        match self.lifecycle {
            Lifecycle::Shown => {
                self.driver.reset();
                return Ok(());
            }
            Lifecycle::Disposed => return Err(ScreenError::Disposed),
            Lifecycle::Created => {}
        }

        let paths = self.config.assets.clone();
        let mut acquired = Vec::new();
        let map: TiledMap = self.acquire(&paths.map, &mut acquired)?;
        let hud: Texture = self.acquire(&paths.hud, &mut acquired)?;
        let player_texture: Texture = self.acquire(&paths.player, &mut acquired)?;

        let ppm = self.config.ppm;
        let centre = Vec2::new(self.config.viewport.width, self.config.viewport.height) / 2.0;
        let size = Vec2::new(self.config.player.width, self.config.player.height);
        let body = create_box(
            self.physics.as_mut(),
            centre.x,
            centre.y,
            size.x,
            size.y,
            BodyKind::Dynamic,
            ppm,
        );
        let player = Player::new(body, self.physics.as_ref(), size, player_texture);

        let ground_cfg = self.config.ground;
        let ground = create_box(
            self.physics.as_mut(),
            centre.x,
            centre.y + ground_cfg.offset_y,
            ground_cfg.width,
            ground_cfg.height,
            BodyKind::Static,
            ppm,
        );

        self.stage = Some(Stage {
            map,
            hud,
            player,
            ground,
            acquired,
        });
        self.driver.reset();
        self.lifecycle = Lifecycle::Shown;
        tracing::info!(map = %paths.map, bodies = self.physics.body_count(), "play screen shown");
        Ok(())
    }

    fn render(&mut self, delta: f32, frame: &mut FrameContext<'_>) -> Result<(), ScreenError> {
        match self.lifecycle {
            Lifecycle::Created => return Err(ScreenError::NotShown),
            Lifecycle::Disposed => return Err(ScreenError::Disposed),
            Lifecycle::Shown => {}
        }

        let plan = self.driver.advance(self.clock.now());
        let dt = self.config.step_seconds();
        for _ in 0..plan.steps {
            self.step(dt);
        }
        tracing::trace!(delta, steps = plan.steps, "frame");

        self.draw(frame);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "resize; keeping virtual viewport");
        let viewport = self.config.viewport;
        self.camera.set_to_ortho(viewport.width, viewport.height);
    }

    fn pause(&mut self) {
        tracing::debug!("play screen paused");
    }

    fn resume(&mut self) {
        self.driver.reset();
        tracing::debug!("play screen resumed");
    }

    fn hide(&mut self) {
        tracing::debug!("play screen hidden");
    }

    fn dispose(&mut self) -> Result<(), ScreenError> {
        if self.lifecycle == Lifecycle::Disposed {
            return Ok(());
        }
        self.lifecycle = Lifecycle::Disposed;

        let mut failures: Vec<ReleaseError> = Vec::new();
        if let Err(e) = self.physics.release() {
            failures.push(e);
        }
        if let Err(e) = self.debug_renderer.release() {
            failures.push(e);
        }
        if let Err(e) = self.map_renderer.release() {
            failures.push(e);
        }
        if let Some(stage) = self.stage.take() {
            for path in &stage.acquired {
                if let Err(e) = self.assets.release(path) {
                    failures.push(ReleaseError::new(path.clone(), e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            tracing::info!("play screen disposed");
            return Ok(());
        }
        for failure in &failures {
            tracing::error!("{failure}");
        }
        Err(TeardownError { failures }.into())
    }
}
