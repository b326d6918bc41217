//! Rigid-body backend on top of rapier3d.
//!
//! `step(dt)` accumulates frame time and runs fixed internal steps, at most
//! `max_substeps` per call; time beyond that budget is dropped. Locomotion is
//! applied as velocity deltas and jumps as central impulses.

use glam::{Quat, Vec3};
use playground_common::PhysicsConfig;
use rapier3d::prelude::*;

use crate::{
    BodyDescriptor, BodyHandle, BodyShape, BodyTransform, MotionModel, PhysicsBackend,
    PhysicsError,
};

enum Slot {
    Created {
        body: RigidBody,
        collider: Collider,
    },
    Simulated(RigidBodyHandle),
    Removed,
}

/// All rapier state for one world.
///
/// `PhysicsPipeline::step()` needs mutable access to every set at once, so
/// they live together.
pub struct RigidWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    slots: Vec<Slot>,
    fixed_timestep: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl RigidWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self::from_config(&PhysicsConfig {
            gravity,
            ..PhysicsConfig::default()
        })
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_timestep;

        Self {
            gravity: to_vector(config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            slots: Vec::new(),
            fixed_timestep: config.fixed_timestep,
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    /// Current linear velocity of a simulated body.
    pub fn linear_velocity(&self, body: BodyHandle) -> Result<Vec3, PhysicsError> {
        let rb = self.rigid_body(body)?;
        Ok(from_vector(rb.linvel()))
    }

    fn handle(&self, body: BodyHandle) -> Result<RigidBodyHandle, PhysicsError> {
        match self.slots.get(body.index()) {
            Some(Slot::Simulated(handle)) => Ok(*handle),
            Some(_) => Err(PhysicsError::BodyNotInWorld(body)),
            None => Err(PhysicsError::UnknownBody(body)),
        }
    }

    fn rigid_body(&self, body: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        let handle = self.handle(body)?;
        self.rigid_body_set
            .get(handle)
            .ok_or(PhysicsError::BodyNotInWorld(body))
    }

    fn rigid_body_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        let handle = self.handle(body)?;
        self.rigid_body_set
            .get_mut(handle)
            .ok_or(PhysicsError::BodyNotInWorld(body))
    }

    /// Run one internal step of `fixed_timestep`.
    fn step_once(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Scaled rotation axis, the form rapier's builders take for orientation.
fn to_angvector(q: Quat) -> AngVector<Real> {
    let (axis, angle) = q.normalize().to_axis_angle();
    let scaled = axis * angle;
    vector![scaled.x, scaled.y, scaled.z]
}

fn from_rotation(r: &Rotation<Real>) -> Quat {
    let c = r.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

fn build_collider(descriptor: &BodyDescriptor) -> Collider {
    let mut builder = match descriptor.shape {
        BodyShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        BodyShape::Ball { radius } => ColliderBuilder::ball(radius),
    };
    if let Some(friction) = descriptor.friction {
        builder = builder
            .friction(friction)
            .friction_combine_rule(CoefficientCombineRule::Min);
    }
    if !descriptor.is_static() {
        builder = builder.mass(descriptor.mass);
    }
    builder.build()
}

fn build_body(descriptor: &BodyDescriptor) -> RigidBody {
    let mut builder = if descriptor.is_static() {
        RigidBodyBuilder::fixed()
    } else {
        RigidBodyBuilder::dynamic()
    };
    if descriptor.lock_rotations {
        builder = builder.lock_rotations();
    }
    builder
        .translation(to_vector(descriptor.position))
        .rotation(to_angvector(descriptor.orientation))
        .build()
}

impl PhysicsBackend for RigidWorld {
    fn name(&self) -> &str {
        "rigid-body"
    }

    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
        descriptor.validate()?;
        let handle = BodyHandle(self.slots.len() as u32);
        self.slots.push(Slot::Created {
            body: build_body(descriptor),
            collider: build_collider(descriptor),
        });
        Ok(handle)
    }

    fn add_to_world(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let slot = self
            .slots
            .get_mut(body.index())
            .ok_or(PhysicsError::UnknownBody(body))?;
        match std::mem::replace(slot, Slot::Removed) {
            Slot::Created {
                body: rigid_body,
                collider,
            } => {
                let handle = self.rigid_body_set.insert(rigid_body);
                self.collider_set
                    .insert_with_parent(collider, handle, &mut self.rigid_body_set);
                *slot = Slot::Simulated(handle);
                tracing::trace!(?body, "body added to rigid world");
                Ok(())
            }
            Slot::Simulated(handle) => {
                *slot = Slot::Simulated(handle);
                Err(PhysicsError::AlreadyInWorld(body))
            }
            Slot::Removed => Err(PhysicsError::UnknownBody(body)),
        }
    }

    fn remove_from_world(&mut self, body: BodyHandle) -> bool {
        let Some(slot) = self.slots.get_mut(body.index()) else {
            return false;
        };
        match std::mem::replace(slot, Slot::Removed) {
            Slot::Created { .. } => true,
            Slot::Simulated(handle) => {
                self.rigid_body_set.remove(
                    handle,
                    &mut self.island_manager,
                    &mut self.collider_set,
                    &mut self.impulse_joint_set,
                    &mut self.multibody_joint_set,
                    true,
                );
                true
            }
            Slot::Removed => false,
        }
    }

    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= self.fixed_timestep && substeps < self.max_substeps {
            self.step_once();
            self.accumulator -= self.fixed_timestep;
            substeps += 1;
        }
        if substeps == self.max_substeps && self.accumulator >= self.fixed_timestep {
            tracing::debug!(
                dropped = self.accumulator,
                "rigid world fell behind, dropping accumulated time"
            );
            self.accumulator %= self.fixed_timestep;
        }
        tracing::trace!(substeps, "rigid world stepped");
    }

    fn read_transform(&self, body: BodyHandle) -> Result<BodyTransform, PhysicsError> {
        let rb = self.rigid_body(body)?;
        Ok(BodyTransform {
            position: from_vector(rb.translation()),
            orientation: from_rotation(rb.rotation()),
        })
    }

    fn motion_model(&self) -> MotionModel {
        MotionModel::VelocityDelta
    }

    fn apply_position_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        let rb = self.rigid_body_mut(body)?;
        let mut translation = *rb.translation();
        translation.x += dx;
        translation.z += dz;
        rb.set_translation(translation, true);
        Ok(())
    }

    fn set_horizontal_velocity_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        let rb = self.rigid_body_mut(body)?;
        let mut velocity = *rb.linvel();
        velocity.x += dx;
        velocity.z += dz;
        rb.set_linvel(velocity, true);
        Ok(())
    }

    fn apply_upward_impulse(
        &mut self,
        body: BodyHandle,
        magnitude: f32,
    ) -> Result<(), PhysicsError> {
        let rb = self.rigid_body_mut(body)?;
        rb.apply_impulse(vector![0.0, magnitude, 0.0], true);
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_common::ObjectOptions;

    const DT: f32 = 1.0 / 60.0;

    fn add(world: &mut RigidWorld, options: ObjectOptions) -> BodyHandle {
        let handle = world
            .create_body(&BodyDescriptor::from_options(&options))
            .unwrap();
        world.add_to_world(handle).unwrap();
        handle
    }

    #[test]
    fn box_falls_and_settles_on_plane() {
        let mut world = RigidWorld::new(Vec3::new(0.0, -15.82, 0.0));
        add(
            &mut world,
            ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(400.0, 2.0, 400.0)),
        );
        let cube = add(
            &mut world,
            ObjectOptions::at(Vec3::new(1.0, 10.0, -3.0))
                .with_size(Vec3::ONE)
                .with_mass(1.0),
        );
        let rest = 1.0 + 0.5;

        let mut previous = world.read_transform(cube).unwrap().position.y;
        let mut still_frames = 0;
        for _ in 0..600 {
            world.step(DT);
            let y = world.read_transform(cube).unwrap().position.y;
            if previous > rest + 0.25 {
                assert!(y < previous, "box must fall every frame while airborne");
            }
            if (y - previous).abs() < 1e-3 {
                still_frames += 1;
            } else {
                still_frames = 0;
            }
            previous = y;
        }
        assert!(still_frames >= 30);
        assert!((previous - rest).abs() < 0.05, "y = {previous}");
    }

    #[test]
    fn zero_dt_does_not_step() {
        let mut world = RigidWorld::new(Vec3::new(0.0, -10.0, 0.0));
        let body = add(&mut world, ObjectOptions::at(Vec3::Y * 5.0).with_mass(1.0));
        world.step(0.0);
        world.step(0.0);
        let p = world.read_transform(body).unwrap().position;
        assert_eq!(p, Vec3::Y * 5.0);
    }

    #[test]
    fn short_frames_accumulate_into_fixed_steps() {
        let mut world = RigidWorld::new(Vec3::new(0.0, -10.0, 0.0));
        let body = add(&mut world, ObjectOptions::at(Vec3::Y * 5.0).with_mass(1.0));
        world.step(DT * 0.4);
        assert_eq!(world.read_transform(body).unwrap().position.y, 5.0);
        world.step(DT * 0.7);
        assert!(world.read_transform(body).unwrap().position.y < 5.0);
    }

    #[test]
    fn velocity_delta_and_impulse() {
        let mut world = RigidWorld::new(Vec3::ZERO);
        let body = add(&mut world, ObjectOptions::at(Vec3::ZERO).with_mass(1.0));
        assert_eq!(world.motion_model(), MotionModel::VelocityDelta);
        world.step(DT);

        world.set_horizontal_velocity_delta(body, 1.0, -2.0).unwrap();
        let v = world.linear_velocity(body).unwrap();
        assert!((v.x - 1.0).abs() < 1e-5 && (v.z + 2.0).abs() < 1e-5);

        world.apply_upward_impulse(body, 5.0).unwrap();
        let v = world.linear_velocity(body).unwrap();
        assert!(v.y > 0.0);
    }

    #[test]
    fn frictionless_upright_body_slides_under_velocity_deltas() {
        fn walk(descriptor: BodyDescriptor) -> f32 {
            let mut world = RigidWorld::new(Vec3::new(0.0, -15.82, 0.0));
            add(
                &mut world,
                ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(400.0, 2.0, 400.0)),
            );
            let body = world.create_body(&descriptor).unwrap();
            world.add_to_world(body).unwrap();
            for _ in 0..60 {
                world.step(DT);
                world.set_horizontal_velocity_delta(body, 0.0, -2.0 * DT).unwrap();
            }
            world.read_transform(body).unwrap().position.z
        }
        let options = ObjectOptions::at(Vec3::new(0.0, 1.5, 0.0))
            .with_size(Vec3::new(0.6, 1.0, 0.6))
            .with_mass(1.0);

        let stuck = walk(BodyDescriptor::from_options(&options));
        assert!(stuck.abs() < 0.05, "z = {stuck}");

        let moved = walk(
            BodyDescriptor::from_options(&options)
                .with_friction(0.0)
                .with_locked_rotations(),
        );
        assert!(moved < -0.5, "z = {moved}");
    }

    #[test]
    fn locked_body_stays_upright() {
        let mut world = RigidWorld::new(Vec3::new(0.0, -10.0, 0.0));
        add(
            &mut world,
            ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(10.0, 2.0, 10.0)),
        );
        let descriptor = BodyDescriptor::from_options(
            &ObjectOptions::at(Vec3::new(0.0, 1.6, 0.0)).with_mass(1.0),
        )
        .with_locked_rotations();
        let body = world.create_body(&descriptor).unwrap();
        world.add_to_world(body).unwrap();
        world.apply_upward_impulse(body, 1.0).unwrap();
        world.set_horizontal_velocity_delta(body, 3.0, 0.0).unwrap();
        for _ in 0..60 {
            world.step(DT);
        }
        let q = world.read_transform(body).unwrap().orientation;
        assert!(q.angle_between(Quat::IDENTITY) < 1e-4);
    }

    #[test]
    fn orientation_is_preserved_on_creation() {
        let mut world = RigidWorld::new(Vec3::ZERO);
        let q = Quat::from_rotation_y(0.75);
        let body = add(
            &mut world,
            ObjectOptions::at(Vec3::ZERO)
                .with_orientation(q)
                .with_mass(1.0),
        );
        let read = world.read_transform(body).unwrap().orientation;
        assert!(read.dot(q).abs() > 0.9999);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut world = RigidWorld::new(Vec3::ZERO);
        let body = add(&mut world, ObjectOptions::at(Vec3::ZERO).with_mass(1.0));
        assert_eq!(world.body_count(), 1);
        assert!(world.remove_from_world(body));
        assert!(!world.remove_from_world(body));
        assert_eq!(world.body_count(), 0);
        assert!(world.read_transform(body).is_err());
    }
}
