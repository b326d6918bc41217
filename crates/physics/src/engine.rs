use playground_common::{BackendKind, PhysicsConfig};

use crate::{
    BodyDescriptor, BodyHandle, BodyTransform, MotionModel, PhysicsBackend, PhysicsError,
    RigidWorld, SimpleWorld,
};

/// A physics world of either backend, chosen at construction time.
pub enum PhysicsWorld {
    Simple(SimpleWorld),
    Rigid(RigidWorld),
}

impl PhysicsWorld {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Simple(_) => BackendKind::Simple,
            Self::Rigid(_) => BackendKind::Rigid,
        }
    }

    fn backend(&self) -> &dyn PhysicsBackend {
        match self {
            Self::Simple(world) => world,
            Self::Rigid(world) => world,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn PhysicsBackend {
        match self {
            Self::Simple(world) => world,
            Self::Rigid(world) => world,
        }
    }
}

impl PhysicsBackend for PhysicsWorld {
    fn name(&self) -> &str {
        self.backend().name()
    }

    fn create_body(&mut self, descriptor: &BodyDescriptor) -> Result<BodyHandle, PhysicsError> {
        self.backend_mut().create_body(descriptor)
    }

    fn add_to_world(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.backend_mut().add_to_world(body)
    }

    fn remove_from_world(&mut self, body: BodyHandle) -> bool {
        self.backend_mut().remove_from_world(body)
    }

    fn step(&mut self, dt: f32) {
        self.backend_mut().step(dt)
    }

    fn read_transform(&self, body: BodyHandle) -> Result<BodyTransform, PhysicsError> {
        self.backend().read_transform(body)
    }

    fn motion_model(&self) -> MotionModel {
        self.backend().motion_model()
    }

    fn apply_position_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        self.backend_mut().apply_position_delta(body, dx, dz)
    }

    fn set_horizontal_velocity_delta(
        &mut self,
        body: BodyHandle,
        dx: f32,
        dz: f32,
    ) -> Result<(), PhysicsError> {
        self.backend_mut().set_horizontal_velocity_delta(body, dx, dz)
    }

    fn apply_upward_impulse(
        &mut self,
        body: BodyHandle,
        magnitude: f32,
    ) -> Result<(), PhysicsError> {
        self.backend_mut().apply_upward_impulse(body, magnitude)
    }

    fn body_count(&self) -> usize {
        self.backend().body_count()
    }
}

/// Initialized physics engine. Worlds are created from it on demand.
///
/// Holds only validated settings; there is no process-wide engine state.
#[derive(Debug, Clone)]
pub struct PhysicsEngineHandle {
    config: PhysicsConfig,
}

impl PhysicsEngineHandle {
    /// Validate settings and bring the engine up.
    pub async fn initialize(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        validate(&config)?;
        tracing::debug!(backend = ?config.backend, gravity = %config.gravity, "physics engine ready");
        Ok(Self { config })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Build a fresh world of the configured backend.
    pub fn create_world(&self) -> PhysicsWorld {
        match self.config.backend {
            BackendKind::Simple => PhysicsWorld::Simple(SimpleWorld::from_config(&self.config)),
            BackendKind::Rigid => PhysicsWorld::Rigid(RigidWorld::from_config(&self.config)),
        }
    }
}

fn validate(config: &PhysicsConfig) -> Result<(), PhysicsError> {
    if !config.gravity.is_finite() {
        return Err(PhysicsError::InvalidSettings("gravity must be finite".into()));
    }
    if !config.fixed_timestep.is_finite() || config.fixed_timestep <= 0.0 {
        return Err(PhysicsError::InvalidSettings(format!(
            "fixed timestep must be positive, got {}",
            config.fixed_timestep
        )));
    }
    if config.max_substeps == 0 {
        return Err(PhysicsError::InvalidSettings(
            "at least one substep is required".into(),
        ));
    }
    if !(0.0..=1.0).contains(&config.linear_damping) {
        return Err(PhysicsError::InvalidSettings(format!(
            "linear damping must be within [0, 1], got {}",
            config.linear_damping
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use playground_common::ObjectOptions;

    #[test]
    fn initialize_rejects_bad_settings() {
        let config = PhysicsConfig {
            fixed_timestep: 0.0,
            ..PhysicsConfig::default()
        };
        let result = pollster::block_on(PhysicsEngineHandle::initialize(config));
        assert!(matches!(result, Err(PhysicsError::InvalidSettings(_))));

        let config = PhysicsConfig {
            gravity: Vec3::new(0.0, f32::NAN, 0.0),
            ..PhysicsConfig::default()
        };
        let result = pollster::block_on(PhysicsEngineHandle::initialize(config));
        assert!(result.is_err());
    }

    #[test]
    fn creates_configured_backend() {
        for kind in [BackendKind::Simple, BackendKind::Rigid] {
            let config = PhysicsConfig {
                backend: kind,
                ..PhysicsConfig::default()
            };
            let engine = pollster::block_on(PhysicsEngineHandle::initialize(config)).unwrap();
            let world = engine.create_world();
            assert_eq!(world.kind(), kind);
        }
    }

    #[test]
    fn worlds_from_one_engine_are_independent() {
        let engine =
            pollster::block_on(PhysicsEngineHandle::initialize(PhysicsConfig::default())).unwrap();
        let mut a = engine.create_world();
        let b = engine.create_world();
        let body = a
            .create_body(&BodyDescriptor::from_options(&ObjectOptions::default()))
            .unwrap();
        a.add_to_world(body).unwrap();
        assert_eq!(a.body_count(), 1);
        assert_eq!(b.body_count(), 0);
    }

    #[test]
    fn enum_dispatch_reports_backend_traits() {
        let simple = PhysicsWorld::Simple(SimpleWorld::new(Vec3::ZERO));
        let rigid = PhysicsWorld::Rigid(RigidWorld::new(Vec3::ZERO));
        assert_eq!(simple.motion_model(), MotionModel::PositionDelta);
        assert_eq!(rigid.motion_model(), MotionModel::VelocityDelta);
        assert_eq!(simple.name(), "simple-body");
        assert_eq!(rigid.name(), "rigid-body");
    }
}
