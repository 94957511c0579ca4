use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("lighting {field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("lighting ambient_strength must be non-negative, got {0}")]
    NegativeAmbient(f32),
    #[error("lighting max_hz {0} is too small to derive a frame period")]
    MaxRate(f32),
    #[error("lighting needs at least one source layer")]
    NoLayers,
    #[error(transparent)]
    Grid(#[from] strata_world::ConfigError),
}

#[derive(Clone, Debug, Deserialize)]
pub struct LightingConfig {
    /// Three channels when set, one grayscale channel otherwise.
    #[serde(default = "default_true")]
    pub colored: bool,
    /// Bilinear resampling in `LightField::sample`.
    #[serde(default = "default_true")]
    pub smooth: bool,
    #[serde(default = "default_ambient_color")]
    pub ambient_color: [f32; 3],
    #[serde(default = "default_ambient_strength")]
    pub ambient_strength: f32,
    /// Row where sky ambient starts to fade.
    #[serde(default = "default_ambient_end")]
    pub ambient_end: f32,
    /// Rows over which ambient fades from full to zero.
    #[serde(default = "default_ambient_falloff_range")]
    pub ambient_falloff_range: f32,
    #[serde(default = "default_light_threshold")]
    pub light_threshold: f32,
    /// Grid layers consulted per cell, highest priority first.
    #[serde(default = "default_layers")]
    pub layers: Vec<usize>,
    #[serde(default = "default_max_hz")]
    pub max_hz: f32,
}

fn default_true() -> bool {
    true
}
fn default_ambient_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_ambient_strength() -> f32 {
    1.0
}
fn default_ambient_end() -> f32 {
    10.0
}
fn default_ambient_falloff_range() -> f32 {
    40.0
}
fn default_light_threshold() -> f32 {
    0.05
}
fn default_layers() -> Vec<usize> {
    vec![0]
}
fn default_max_hz() -> f32 {
    60.0
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            colored: true,
            smooth: true,
            ambient_color: default_ambient_color(),
            ambient_strength: default_ambient_strength(),
            ambient_end: default_ambient_end(),
            ambient_falloff_range: default_ambient_falloff_range(),
            light_threshold: default_light_threshold(),
            layers: default_layers(),
            max_hz: default_max_hz(),
        }
    }
}

impl LightingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ambient_falloff_range", self.ambient_falloff_range),
            ("light_threshold", self.light_threshold),
            ("max_hz", self.max_hz),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(1.0 / self.max_hz).is_finite() {
            return Err(ConfigError::MaxRate(self.max_hz));
        }
        if !(self.ambient_strength >= 0.0) {
            return Err(ConfigError::NegativeAmbient(self.ambient_strength));
        }
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        Ok(())
    }

    #[inline]
    pub fn channels(&self) -> usize {
        if self.colored { 3 } else { 1 }
    }

    /// Sky ambient scale for row `y`: 1 above `ambient_end`, fading linearly to 0.
    #[inline]
    pub fn ambient_falloff(&self, y: i32) -> f32 {
        (1.0 - (y as f32 - self.ambient_end) / self.ambient_falloff_range).clamp(0.0, 1.0)
    }
}
