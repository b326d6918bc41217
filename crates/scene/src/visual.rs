use glam::Vec3;
use playground_common::Transform;
use serde::{Deserialize, Serialize};

/// Shape data of one mesh part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
    /// Skinned mesh driven by a skeleton of `bones` joints.
    Skinned { bones: u32 },
}

impl Geometry {
    pub fn describe(&self) -> String {
        match self {
            Self::Cuboid { size } => format!("cuboid {:.2}x{:.2}x{:.2}", size.x, size.y, size.z),
            Self::Sphere { radius } => format!("sphere r={radius:.2}"),
            Self::Skinned { bones } => format!("skinned ({bones} bones)"),
        }
    }
}

/// Surface appearance, as a packed `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub color: u32,
}

impl Material {
    pub fn color(color: u32) -> Self {
        Self { color }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self { color: 0x888888 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPart {
    pub geometry: Geometry,
    pub material: Material,
}

/// A renderable object: a transform plus the mesh parts drawn with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualObject {
    pub label: String,
    pub transform: Transform,
    pub parts: Vec<MeshPart>,
}

impl VisualObject {
    pub fn cuboid(label: impl Into<String>, size: Vec3, material: Material) -> Self {
        Self::group(
            label,
            vec![MeshPart {
                geometry: Geometry::Cuboid { size },
                material,
            }],
        )
    }

    pub fn sphere(label: impl Into<String>, radius: f32, material: Material) -> Self {
        Self::group(
            label,
            vec![MeshPart {
                geometry: Geometry::Sphere { radius },
                material,
            }],
        )
    }

    /// Object made of several parts sharing one transform, e.g. a loaded model.
    pub fn group(label: impl Into<String>, parts: Vec<MeshPart>) -> Self {
        Self {
            label: label.into(),
            transform: Transform::default(),
            parts,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }
}
