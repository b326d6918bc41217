use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Declarative description of a scene object, shared by the visual builder
/// and the physics builder of a registry entry.
///
/// `size` takes precedence over `radius` when both are present. A `mass` of
/// zero describes a static object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectOptions {
    pub position: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default = "identity")]
    pub orientation: Quat,
    pub mass: f32,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Default for ObjectOptions {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: None,
            radius: None,
            orientation: Quat::IDENTITY,
            mass: 0.0,
        }
    }
}

impl ObjectOptions {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: Vec3) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    /// Full extents of the object, falling back to a unit cube.
    pub fn size_or_unit(&self) -> Vec3 {
        self.size.unwrap_or(Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let o = ObjectOptions::at(Vec3::new(1.0, 10.0, -3.0))
            .with_size(Vec3::splat(2.0))
            .with_mass(1.0);
        assert_eq!(o.position, Vec3::new(1.0, 10.0, -3.0));
        assert_eq!(o.size, Some(Vec3::splat(2.0)));
        assert_eq!(o.orientation, Quat::IDENTITY);
        assert!(!o.is_static());
    }

    #[test]
    fn zero_mass_is_static() {
        assert!(ObjectOptions::default().is_static());
        assert_eq!(ObjectOptions::default().size_or_unit(), Vec3::ONE);
    }
}
