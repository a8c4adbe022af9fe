//! Compositor configuration.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid config. Unknown keys are
//! rejected to catch typos in hand-edited files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::color::ColorMatrix;
use crate::error::BackdropError;

/// Texture units `0..HOST_RESERVED_UNITS` belong to the host renderer's materials.
pub const HOST_RESERVED_UNITS: u32 = 5;

/// Default unit the luma (Y) plane is bound to during the composite.
pub const DEFAULT_LUMA_UNIT: u32 = 5;

/// Default unit the chroma (UV) plane is bound to during the composite.
pub const DEFAULT_CHROMA_UNIT: u32 = 6;

/// Near clip distance requested from the pose source.
pub const DEFAULT_NEAR: f32 = 0.001;

/// Far clip distance requested from the pose source.
pub const DEFAULT_FAR: f32 = 1000.0;

/// GLSL flavour the program is generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderDialect {
    /// `#version 330 core` (desktop GL 3.3+).
    #[default]
    Glsl330Core,
    /// GLSL ES 1.00 (GLES 2 / WebGL 1 style: `attribute`, `varying`, `texture2D`).
    GlslEs100,
}

/// Fixed texture units used by the composite.
///
/// Contract: both units are `>= host_reserved` and distinct. They are written into the sampler
/// uniforms once, at program build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextureUnits {
    pub luma: u32,
    pub chroma: u32,
    /// Units below this index are assumed to be in use by the host.
    pub host_reserved: u32,
}

impl Default for TextureUnits {
    fn default() -> Self {
        Self {
            luma: DEFAULT_LUMA_UNIT,
            chroma: DEFAULT_CHROMA_UNIT,
            host_reserved: HOST_RESERVED_UNITS,
        }
    }
}

impl TextureUnits {
    /// Units in capture order (luma first).
    pub fn as_array(&self) -> [u32; 2] {
        [self.luma, self.chroma]
    }

    pub fn validate(&self) -> Result<(), BackdropError> {
        if self.luma == self.chroma {
            return Err(BackdropError::invalid(format!(
                "luma and chroma must use different texture units (both are {})",
                self.luma
            )));
        }
        for (name, unit) in [("luma", self.luma), ("chroma", self.chroma)] {
            if unit < self.host_reserved {
                return Err(BackdropError::invalid(format!(
                    "{name} texture unit {unit} overlaps host-reserved units 0..{}",
                    self.host_reserved
                )));
            }
        }
        Ok(())
    }
}

/// Near/far distances passed to `PoseSource::projection_matrix`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipPlanes {
    pub near: f32,
    pub far: f32,
}

impl Default for ClipPlanes {
    fn default() -> Self {
        Self {
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl ClipPlanes {
    pub fn validate(&self) -> Result<(), BackdropError> {
        if !(self.near.is_finite() && self.far.is_finite()) {
            return Err(BackdropError::invalid("clip planes must be finite"));
        }
        if self.near <= 0.0 {
            return Err(BackdropError::invalid(format!(
                "near clip must be > 0 (got {})",
                self.near
            )));
        }
        if self.far <= self.near {
            return Err(BackdropError::invalid(format!(
                "far clip ({}) must exceed near clip ({})",
                self.far, self.near
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    pub units: TextureUnits,
    pub clip: ClipPlanes,
    pub dialect: ShaderDialect,
    pub color_matrix: ColorMatrix,
}

impl CompositorConfig {
    pub fn validate(&self) -> Result<(), BackdropError> {
        self.units.validate()?;
        self.clip.validate()?;
        Ok(())
    }
}

/// Parse already-loaded JSON text into `T`, attributing errors to `path`.
pub fn load_typed_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, BackdropError> {
    serde_json::from_str(text).map_err(|source| BackdropError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate a config from JSON text.
pub fn parse_config(path: &Path, text: &str) -> Result<CompositorConfig, BackdropError> {
    let cfg: CompositorConfig = load_typed_json(path, text)?;
    cfg.validate().map_err(|e| e.at_path(path))?;
    Ok(cfg)
}

/// Read, parse and validate a config file.
pub fn load_config_from(path: &Path) -> Result<CompositorConfig, BackdropError> {
    let text = fs::read_to_string(path).map_err(|source| BackdropError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &text)
}
