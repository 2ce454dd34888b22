use crate::world::{BoxDef, PhysicsWorld};
use glam::Vec2;
use playfield_common::{BodyHandle, BodyKind, DebugShape, ReleaseError};
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryPipeline, Real, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};
use std::num::NonZeroUsize;

/// [`PhysicsWorld`] backed by rapier2d.
///
/// Velocity iterations map to rapier's solver iterations, position
/// iterations to its internal PGS iterations.
pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    /// Index = our handle.
    handles: Vec<RigidBodyHandle>,
    released: bool,
}

impl RapierWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: Vector::new(gravity.x, gravity.y),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: Vec::new(),
            released: false,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn rapier_handle(&self, body: BodyHandle) -> Option<RigidBodyHandle> {
        self.handles.get(body.0 as usize).copied()
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, def: &BoxDef) -> BodyHandle {
        let mut builder = match def.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        }
        .translation(Vector::new(def.position.x, def.position.y));
        if def.fixed_rotation {
            builder = builder.lock_rotations();
        }
        let rb = self.bodies.insert(builder.build());

        let collider = ColliderBuilder::cuboid(def.half_extents.x, def.half_extents.y)
            .density(def.density)
            .build();
        self.colliders
            .insert_with_parent(collider, rb, &mut self.bodies);

        self.handles.push(rb);
        BodyHandle(self.handles.len() as u32 - 1)
    }

    fn step(&mut self, dt: f32, velocity_iterations: usize, position_iterations: usize) {
        if self.released {
            tracing::warn!("step on a released physics world ignored");
            return;
        }
        self.params.dt = dt;
        self.params.num_solver_iterations =
            NonZeroUsize::new(velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        self.params.num_internal_pgs_iterations = position_iterations.max(1);

        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec2> {
        let rb = self.bodies.get(self.rapier_handle(body)?)?;
        let t = rb.translation();
        Some(Vec2::new(t.x, t.y))
    }

    fn body_half_extents(&self, body: BodyHandle) -> Option<Vec2> {
        let rb = self.bodies.get(self.rapier_handle(body)?)?;
        let collider = self.colliders.get(*rb.colliders().first()?)?;
        let cuboid = collider.shape().as_cuboid()?;
        Some(Vec2::new(cuboid.half_extents.x, cuboid.half_extents.y))
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        let Some(handle) = self.rapier_handle(body) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_linvel(Vector::new(velocity.x, velocity.y), true);
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn debug_shapes(&self) -> Vec<DebugShape> {
        self.colliders
            .iter()
            .filter_map(|(_, collider)| {
                let cuboid = collider.shape().as_cuboid()?;
                let center = collider.position().translation.vector;
                let dynamic = collider
                    .parent()
                    .and_then(|parent| self.bodies.get(parent))
                    .is_some_and(|rb| rb.is_dynamic());
                Some(DebugShape {
                    center: Vec2::new(center.x, center.y),
                    half_extents: Vec2::new(cuboid.half_extents.x, cuboid.half_extents.y),
                    kind: if dynamic {
                        BodyKind::Dynamic
                    } else {
                        BodyKind::Static
                    },
                })
            })
            .collect()
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        if self.released {
            return Err(ReleaseError::new("physics world", "already released"));
        }
        let count = self.bodies.len();
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.islands = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.handles.clear();
        self.released = true;
        tracing::debug!(bodies = count, "physics world released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::create_box;
    use playfield_common::PixelsPerMeter;

    const PPM: PixelsPerMeter = PixelsPerMeter(32.0);
    const DT: f32 = 1.0 / 60.0;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn box_lands_at_scaled_position() {
        let mut world = RapierWorld::default();
        let h = create_box(&mut world, 320.0, 180.0, 16.0, 16.0, BodyKind::Dynamic, PPM);

        assert!(approx(world.body_position(h).unwrap(), Vec2::new(10.0, 5.625)));
        assert!(approx(
            world.body_half_extents(h).unwrap(),
            Vec2::new(0.25, 0.25)
        ));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn zero_gravity_keeps_bodies_still() {
        let mut world = RapierWorld::default();
        let h = create_box(&mut world, 64.0, 64.0, 16.0, 16.0, BodyKind::Dynamic, PPM);
        for _ in 0..30 {
            world.step(DT, 6, 2);
        }
        assert!(approx(world.body_position(h).unwrap(), Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn dynamic_body_rests_on_static_ground() {
        let mut world = RapierWorld::new(Vec2::new(0.0, -9.8));
        let player = create_box(&mut world, 320.0, 180.0, 16.0, 16.0, BodyKind::Dynamic, PPM);
        let ground = create_box(&mut world, 320.0, 116.0, 128.0, 32.0, BodyKind::Static, PPM);
        for _ in 0..180 {
            world.step(DT, 6, 2);
        }

        let ground_top = world.body_position(ground).unwrap().y + 0.5;
        let y = world.body_position(player).unwrap().y;
        assert!(y > ground_top, "player fell through: y={y}");
        assert!(y < ground_top + 0.4, "player never landed: y={y}");
        assert!(approx(
            world.body_position(ground).unwrap(),
            Vec2::new(10.0, 3.625)
        ));
    }

    #[test]
    fn linear_velocity_moves_body() {
        let mut world = RapierWorld::default();
        let h = create_box(&mut world, 0.0, 0.0, 16.0, 16.0, BodyKind::Dynamic, PPM);
        world.set_linear_velocity(h, Vec2::new(1.0, 0.0));
        for _ in 0..60 {
            world.step(DT, 6, 2);
        }
        let x = world.body_position(h).unwrap().x;
        assert!((x - 1.0).abs() < 0.05, "x={x}");
    }

    #[test]
    fn debug_shapes_report_kinds() {
        let mut world = RapierWorld::default();
        create_box(&mut world, 0.0, 0.0, 16.0, 16.0, BodyKind::Dynamic, PPM);
        create_box(&mut world, 0.0, -64.0, 128.0, 32.0, BodyKind::Static, PPM);

        let shapes = world.debug_shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(
            shapes.iter().filter(|s| s.kind == BodyKind::Static).count(),
            1
        );
        let ground = shapes
            .iter()
            .find(|s| s.kind == BodyKind::Static)
            .unwrap();
        assert!(approx(ground.center, Vec2::new(0.0, -2.0)));
        assert!(approx(ground.half_extents, Vec2::new(2.0, 0.5)));
    }

    #[test]
    fn release_is_single_shot() {
        let mut world = RapierWorld::default();
        let h = create_box(&mut world, 0.0, 0.0, 16.0, 16.0, BodyKind::Dynamic, PPM);
        assert!(world.release().is_ok());
        assert!(world.is_released());
        assert_eq!(world.body_count(), 0);
        assert!(world.body_position(h).is_none());

        world.step(DT, 6, 2);
        assert!(world.release().is_err());
    }
}
