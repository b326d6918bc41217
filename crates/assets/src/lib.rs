//! Character assets: a model plus the animation clips that drive it.
//!
//! Loading is asynchronous and must finish before the first frame; the rest of
//! the playground only ever sees a fully loaded [`CharacterAsset`].
//!
//! # Invariants
//! - A loaded asset has at least one mesh part and at least one clip.
//! - Clip names are unique within an asset.

use playground_scene::VisualObject;
use serde::{Deserialize, Serialize};

pub mod source;

pub use source::{AssetSource, GltfSource, ManifestSource, ProceduralCharacter};

/// One named animation clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds.
    pub duration: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_looping() -> bool {
    true
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            looping: true,
        }
    }

    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }
}

/// A loaded, ready-to-use character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterAsset {
    pub model: VisualObject,
    pub clips: Vec<AnimationClip>,
}

impl CharacterAsset {
    /// Check the asset invariants and build it.
    pub fn new(model: VisualObject, clips: Vec<AnimationClip>) -> Result<Self, AssetError> {
        if model.parts.is_empty() {
            return Err(AssetError::Empty(format!(
                "model {:?} has no mesh parts",
                model.label
            )));
        }
        if clips.is_empty() {
            return Err(AssetError::Empty(format!(
                "model {:?} has no animation clips",
                model.label
            )));
        }
        for (i, clip) in clips.iter().enumerate() {
            if clips[..i].iter().any(|c| c.name == clip.name) {
                return Err(AssetError::DuplicateClip(clip.name.clone()));
            }
        }
        Ok(Self { model, clips })
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Fail with the first name that has no clip.
    pub fn require_clips(&self, names: &[&str]) -> Result<(), AssetError> {
        match names.iter().find(|n| self.clip(n).is_none()) {
            Some(missing) => Err(AssetError::MissingClip((*missing).to_owned())),
            None => Ok(()),
        }
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }
}

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("glTF error: {0}")]
    Gltf(String),
    #[error("missing animation clip {0:?}")]
    MissingClip(String),
    #[error("duplicate animation clip {0:?}")]
    DuplicateClip(String),
    #[error("empty asset: {0}")]
    Empty(String),
}

pub fn crate_info() -> &'static str {
    "playground-assets"
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use playground_scene::Material;

    fn model() -> VisualObject {
        VisualObject::cuboid("body", Vec3::ONE, Material::default())
    }

    #[test]
    fn clip_lookup_by_name() {
        let asset = CharacterAsset::new(
            model(),
            vec![
                AnimationClip::new("Idle", 2.0),
                AnimationClip::new("Jump", 0.9).once(),
            ],
        )
        .unwrap();
        assert_eq!(asset.clip("Jump").unwrap().duration, 0.9);
        assert!(!asset.clip("Jump").unwrap().looping);
        assert!(asset.clip("Swim").is_none());
        assert!(asset.require_clips(&["Idle", "Jump"]).is_ok());
        assert!(matches!(
            asset.require_clips(&["Idle", "Run"]),
            Err(AssetError::MissingClip(name)) if name == "Run"
        ));
    }

    #[test]
    fn rejects_empty_and_duplicate_clips() {
        assert!(matches!(
            CharacterAsset::new(model(), Vec::new()),
            Err(AssetError::Empty(_))
        ));
        assert!(matches!(
            CharacterAsset::new(model(), vec![AnimationClip::new("Idle", 1.0); 2]),
            Err(AssetError::DuplicateClip(_))
        ));
        assert!(matches!(
            CharacterAsset::new(
                VisualObject::group("x", Vec::new()),
                vec![AnimationClip::new("Idle", 1.0)]
            ),
            Err(AssetError::Empty(_))
        ));
    }
}
