//! TOML manifest describing how to assemble a shader program: which stage
//! sources to compile and which uniform values to push once it links.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse program manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid program manifest: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgramManifest {
    pub version: u32,
    #[serde(default)]
    pub stages: Vec<StageEntry>,
    #[serde(default)]
    pub uniforms: UniformDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageEntry {
    pub kind: StageKind,
    pub path: PathBuf,
}

/// Initial values pushed into a freshly linked program. Unset fields leave the
/// device-side default untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UniformDefaults {
    pub color: Option<[f32; 4]>,
    pub heights_info: Option<[f32; 4]>,
    pub camera_position: Option<[f32; 3]>,
    pub time: Option<f32>,
    pub shader_variant: Option<i32>,
    pub octaves: Option<i32>,
    pub bias: Option<f32>,
    pub frequency: Option<f32>,
    pub terrain_height: Option<f32>,
    pub speed: Option<f32>,
}

impl UniformDefaults {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn scalar_fields(&self) -> [(&'static str, Option<f32>); 5] {
        [
            ("time", self.time),
            ("bias", self.bias),
            ("frequency", self.frequency),
            ("terrain_height", self.terrain_height),
            ("speed", self.speed),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(octaves) = self.octaves {
            if octaves < 0 {
                return Err(ConfigError::Invalid(format!(
                    "uniforms.octaves must be >= 0, got {octaves}"
                )));
            }
        }

        for (name, value) in self.scalar_fields() {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ConfigError::Invalid(format!(
                        "uniforms.{name} must be a finite number"
                    )));
                }
            }
        }

        let vectors: [(&str, Option<&[f32]>); 3] = [
            ("color", self.color.as_ref().map(|v| v.as_slice())),
            ("heights_info", self.heights_info.as_ref().map(|v| v.as_slice())),
            (
                "camera_position",
                self.camera_position.as_ref().map(|v| v.as_slice()),
            ),
        ];
        for (name, components) in vectors {
            if let Some(components) = components {
                if components.iter().any(|c| !c.is_finite()) {
                    return Err(ConfigError::Invalid(format!(
                        "uniforms.{name} components must be finite numbers"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl ProgramManifest {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ProgramManifest = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn stage(&self, kind: StageKind) -> Option<&StageEntry> {
        self.stages.iter().find(|stage| stage.kind == kind)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported manifest version {}; expected 1",
                self.version
            )));
        }

        if self.stages.is_empty() {
            return Err(ConfigError::Invalid(
                "manifest must list at least one shader stage".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            if stage.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{:?} stage has an empty path",
                    stage.kind
                )));
            }
            if !seen.insert(stage.kind) {
                return Err(ConfigError::Invalid(format!(
                    "{:?} stage listed more than once",
                    stage.kind
                )));
            }
        }

        self.uniforms.validate()
    }
}
