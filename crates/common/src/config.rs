use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which physics backend a world is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Bodies with directly mutable positions; movement is applied as position deltas.
    #[default]
    Simple,
    /// Full rigid-body pipeline; movement is applied as velocity deltas.
    Rigid,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "rigid" => Ok(Self::Rigid),
            other => Err(ConfigError::Invalid(format!("unknown backend `{other}`"))),
        }
    }
}

/// Physics world configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub backend: BackendKind,
    /// Set once at world construction.
    pub gravity: Vec3,
    /// Internal step of the rigid-body backend.
    pub fixed_timestep: f32,
    /// Upper bound on internal steps per `step` call (rigid-body backend).
    pub max_substeps: u32,
    /// Fraction of velocity lost per second (simple-body backend).
    pub linear_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Simple,
            gravity: Vec3::new(0.0, -15.82, 0.0),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 10,
            linear_damping: 0.01,
        }
    }
}

/// Character locomotion and animation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub walk_velocity: f32,
    pub run_velocity: f32,
    /// Cross-fade duration between animation clips.
    pub fade_duration: f32,
    /// Maximum facing rotation per update, in radians.
    pub max_turn_step: f32,
    /// How long the jump state lasts after a jump is triggered.
    pub jump_duration: f32,
    pub jump_impulse: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            walk_velocity: 2.0,
            run_velocity: 5.0,
            fade_duration: 0.2,
            max_turn_step: 0.2,
            jump_duration: 0.9,
            jump_impulse: 5.0,
        }
    }
}

/// Virtual joystick tuning, in screen pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    /// Drag distance above which the joystick reports a strong push (run).
    pub strength_threshold: f32,
    /// Clamp for the handle offset on each axis.
    pub max_handle_offset: f32,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            strength_threshold: 30.0,
            max_handle_offset: 40.0,
        }
    }
}

/// Initial render surface size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level playground configuration. Every section is optional in YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub physics: PhysicsConfig,
    pub character: CharacterConfig,
    pub joystick: JoystickConfig,
    pub viewport: ViewportConfig,
}

impl PlaygroundConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if !p.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if !p.fixed_timestep.is_finite() || p.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid("fixed_timestep must be positive".into()));
        }
        if p.max_substeps == 0 {
            return Err(ConfigError::Invalid("max_substeps must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&p.linear_damping) {
            return Err(ConfigError::Invalid("linear_damping must be within [0, 1]".into()));
        }

        let c = &self.character;
        for (name, value) in [
            ("walk_velocity", c.walk_velocity),
            ("run_velocity", c.run_velocity),
            ("max_turn_step", c.max_turn_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if c.fade_duration < 0.0 || c.jump_duration < 0.0 || c.jump_impulse < 0.0 {
            return Err(ConfigError::Invalid(
                "fade_duration, jump_duration and jump_impulse must not be negative".into(),
            ));
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid("viewport must not be empty".into()));
        }
        Ok(())
    }
}
