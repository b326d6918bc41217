use std::future::Future;
use std::path::{Path, PathBuf};

use glam::Vec3;
use playground_scene::{Geometry, Material, MeshPart, VisualObject};
use serde::Deserialize;

use crate::{AnimationClip, AssetError, CharacterAsset};

/// Anything that can produce a character asset.
pub trait AssetSource {
    fn load(&self) -> impl Future<Output = Result<CharacterAsset, AssetError>> + Send;
}

/// JSON manifest listing model parts and clips.
///
/// ```json
/// {
///   "model": { "label": "soldier", "parts": [{ "geometry": { "Skinned": { "bones": 24 } } }] },
///   "clips": [{ "name": "Idle", "duration": 2.0 }]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    model: ModelManifest,
    clips: Vec<AnimationClip>,
}

#[derive(Debug, Deserialize)]
struct ModelManifest {
    label: String,
    parts: Vec<PartManifest>,
}

#[derive(Debug, Deserialize)]
struct PartManifest {
    geometry: Geometry,
    #[serde(default)]
    material: Material,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(json: &str) -> Result<CharacterAsset, AssetError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let parts = manifest
            .model
            .parts
            .into_iter()
            .map(|p| MeshPart {
                geometry: p.geometry,
                material: p.material,
            })
            .collect();
        CharacterAsset::new(VisualObject::group(manifest.model.label, parts), manifest.clips)
    }
}

impl AssetSource for ManifestSource {
    async fn load(&self) -> Result<CharacterAsset, AssetError> {
        let data = std::fs::read_to_string(&self.path)?;
        let asset = Self::parse(&data)?;
        tracing::debug!(path = %self.path.display(), clips = asset.clips.len(), "manifest loaded");
        Ok(asset)
    }
}

/// Reads the JSON part of a `.gltf` file: one skinned part per mesh and one
/// clip per animation. Vertex and keyframe buffers are not touched.
#[derive(Debug, Clone)]
pub struct GltfSource {
    path: PathBuf,
}

impl GltfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(label: &str, json: &str) -> Result<CharacterAsset, AssetError> {
        let doc: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AssetError::Gltf(e.to_string()))?;

        let bones = doc
            .get("skins")
            .and_then(|s| s.get(0))
            .and_then(|s| s.get("joints"))
            .and_then(|j| j.as_array())
            .map_or(0, |j| j.len() as u32);

        let mesh_count = doc
            .get("meshes")
            .and_then(|m| m.as_array())
            .map_or(0, |m| m.len());
        let parts = (0..mesh_count)
            .map(|_| MeshPart {
                geometry: Geometry::Skinned { bones },
                material: Material::default(),
            })
            .collect();

        let accessors = doc.get("accessors").and_then(|a| a.as_array());
        let mut clips = Vec::new();
        if let Some(animations) = doc.get("animations").and_then(|a| a.as_array()) {
            for (i, animation) in animations.iter().enumerate() {
                let name = animation
                    .get("name")
                    .and_then(|n| n.as_str())
                    .map_or_else(|| format!("animation_{i}"), str::to_owned);
                let duration = animation_duration(animation, accessors).unwrap_or(1.0);
                clips.push(AnimationClip::new(name, duration));
            }
        }

        CharacterAsset::new(VisualObject::group(label, parts), clips)
    }
}

/// Longest sampler input range of an animation, read from accessor `max`.
fn animation_duration(
    animation: &serde_json::Value,
    accessors: Option<&Vec<serde_json::Value>>,
) -> Option<f32> {
    let accessors = accessors?;
    animation
        .get("samplers")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("input")?.as_u64())
        .filter_map(|input| accessors.get(input as usize)?.get("max")?.get(0)?.as_f64())
        .map(|t| t as f32)
        .reduce(f32::max)
}

impl AssetSource for GltfSource {
    async fn load(&self) -> Result<CharacterAsset, AssetError> {
        let data = std::fs::read_to_string(&self.path)?;
        let label = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model");
        let asset = Self::parse(label, &data)?;
        tracing::debug!(path = %self.path.display(), clips = asset.clips.len(), "glTF metadata loaded");
        Ok(asset)
    }
}

/// Built-in boxy character with Idle, Walk, Run and Jump clips.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralCharacter;

impl ProceduralCharacter {
    pub fn build() -> CharacterAsset {
        let skin = Material::color(0xd9a066);
        let cloth = Material::color(0x3b5998);
        let model = VisualObject::group(
            "procedural-character",
            vec![
                MeshPart {
                    geometry: Geometry::Skinned { bones: 16 },
                    material: cloth,
                },
                MeshPart {
                    geometry: Geometry::Sphere { radius: 0.2 },
                    material: skin,
                },
                MeshPart {
                    geometry: Geometry::Cuboid {
                        size: Vec3::new(0.5, 0.8, 0.3),
                    },
                    material: cloth,
                },
            ],
        );
        let clips = vec![
            AnimationClip::new("Idle", 2.0),
            AnimationClip::new("Walk", 1.0),
            AnimationClip::new("Run", 0.7),
            AnimationClip::new("Jump", 0.9).once(),
        ];
        CharacterAsset { model, clips }
    }
}

impl AssetSource for ProceduralCharacter {
    async fn load(&self) -> Result<CharacterAsset, AssetError> {
        Ok(Self::build())
    }
}
