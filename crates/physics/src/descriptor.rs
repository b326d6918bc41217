use glam::{Quat, Vec3};
use playground_common::ObjectOptions;
use serde::{Deserialize, Serialize};

use crate::PhysicsError;

/// Handle to a body owned by a physics backend.
///
/// Handles index the backend's own arena and are only meaningful for the
/// backend that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

impl BodyShape {
    /// Half extents of the axis-aligned box enclosing the shape.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Cuboid { half_extents } => half_extents,
            Self::Ball { radius } => Vec3::splat(radius),
        }
    }
}

/// Backend-independent description of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    pub position: Vec3,
    pub orientation: Quat,
    pub shape: BodyShape,
    /// Zero describes a static body.
    pub mass: f32,
    /// Contact friction; `None` keeps the backend's default. An explicit value
    /// combines with the other body's friction by taking the smaller one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    /// Keep the body upright: contacts never make it spin.
    #[serde(default)]
    pub lock_rotations: bool,
}

impl BodyDescriptor {
    /// Derive a descriptor from object options: `size` becomes a cuboid,
    /// otherwise `radius` becomes a ball, otherwise a unit cube.
    pub fn from_options(options: &ObjectOptions) -> Self {
        let shape = match (options.size, options.radius) {
            (Some(size), _) => BodyShape::Cuboid {
                half_extents: size * 0.5,
            },
            (None, Some(radius)) => BodyShape::Ball { radius },
            (None, None) => BodyShape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
        };
        Self {
            position: options.position,
            orientation: options.orientation,
            shape,
            mass: options.mass.max(0.0),
            friction: None,
            lock_rotations: false,
        }
    }

    pub fn with_shape(mut self, shape: BodyShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    pub fn with_locked_rotations(mut self) -> Self {
        self.lock_rotations = true;
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Reject descriptors no backend can simulate.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.position.is_finite() || !self.orientation.is_finite() {
            return Err(PhysicsError::InvalidDescriptor(
                "position and orientation must be finite".into(),
            ));
        }
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidDescriptor(format!(
                "mass must be finite and non-negative, got {}",
                self.mass
            )));
        }
        if self.friction.is_some_and(|f| !f.is_finite() || f < 0.0) {
            return Err(PhysicsError::InvalidDescriptor(format!(
                "friction must be finite and non-negative, got {:?}",
                self.friction
            )));
        }
        let extents = self.shape.half_extents();
        if !extents.is_finite() || extents.min_element() <= 0.0 {
            return Err(PhysicsError::InvalidDescriptor(format!(
                "shape extents must be positive, got {extents}"
            )));
        }
        Ok(())
    }
}

/// Pose of a body as read after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyTransform {
    pub position: Vec3,
    pub orientation: Quat,
}

/// How a backend expects locomotion to be applied to its bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionModel {
    /// Move bodies by writing position increments.
    PositionDelta,
    /// Move bodies by adding to their linear velocity.
    VelocityDelta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_becomes_cuboid_half_extents() {
        let options = ObjectOptions::at(Vec3::ZERO).with_size(Vec3::new(400.0, 2.0, 400.0));
        let desc = BodyDescriptor::from_options(&options);
        assert_eq!(
            desc.shape,
            BodyShape::Cuboid {
                half_extents: Vec3::new(200.0, 1.0, 200.0)
            }
        );
        assert!(desc.is_static());
    }

    #[test]
    fn size_takes_precedence_over_radius() {
        let options = ObjectOptions::at(Vec3::ZERO)
            .with_size(Vec3::ONE)
            .with_radius(3.0);
        let desc = BodyDescriptor::from_options(&options);
        assert!(matches!(desc.shape, BodyShape::Cuboid { .. }));
    }

    #[test]
    fn radius_becomes_ball() {
        let options = ObjectOptions::at(Vec3::Y).with_radius(0.25).with_mass(1.0);
        let desc = BodyDescriptor::from_options(&options);
        assert_eq!(desc.shape, BodyShape::Ball { radius: 0.25 });
        assert_eq!(desc.shape.half_extents(), Vec3::splat(0.25));
    }

    #[test]
    fn validate_rejects_degenerate_shapes() {
        let desc = BodyDescriptor::from_options(&ObjectOptions::default())
            .with_shape(BodyShape::Ball { radius: 0.0 });
        assert!(desc.validate().is_err());

        let mut desc = BodyDescriptor::from_options(&ObjectOptions::default());
        desc.mass = f32::NAN;
        assert!(desc.validate().is_err());

        let desc = BodyDescriptor::from_options(&ObjectOptions::default()).with_friction(-0.1);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn contact_tuning_defaults_off() {
        let desc = BodyDescriptor::from_options(&ObjectOptions::default().with_mass(1.0));
        assert_eq!(desc.friction, None);
        assert!(!desc.lock_rotations);
        let desc = desc.with_friction(0.0).with_locked_rotations();
        assert_eq!(desc.friction, Some(0.0));
        assert!(desc.lock_rotations);
        assert!(desc.validate().is_ok());
    }
}
