use serde::Deserialize;
use thiserror::Error;

use strata_blocks::BlockId;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fluid {field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("fluid min_value {min} must be below max_value {max}")]
    MinAboveMax { min: f32, max: f32 },
    #[error("fluid max_compression must be non-negative, got {0}")]
    NegativeCompression(f32),
    #[error("fluid tick_hz {0} is too small to derive a tick period")]
    TickRate(f32),
    #[error("fluid block id must not be 0 (air)")]
    AirFluid,
    #[error(transparent)]
    Grid(#[from] strata_world::ConfigError),
}

#[derive(Clone, Debug, Deserialize)]
pub struct FluidConfig {
    #[serde(default = "default_block_id")]
    pub block_id: BlockId,
    #[serde(default)]
    pub layer: usize,
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f32,
    /// Cells holding less than this are emptied.
    #[serde(default = "default_min_value")]
    pub min_value: f32,
    /// Amount of one full uncompressed cell.
    #[serde(default = "default_max_value")]
    pub max_value: f32,
    /// Extra amount a cell may hold per cell stacked above it.
    #[serde(default = "default_max_compression")]
    pub max_compression: f32,
    #[serde(default = "default_min_flow")]
    pub min_flow: f32,
    #[serde(default = "default_max_flow")]
    pub max_flow: f32,
    #[serde(default = "default_flow_speed")]
    pub flow_speed: f32,
    /// Only fall straight down into empty cells; no spreading.
    #[serde(default)]
    pub vertical_only: bool,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
    #[serde(default = "default_pressure_color")]
    pub pressure_color: [f32; 4],
}

fn default_block_id() -> BlockId {
    3
}
fn default_tick_hz() -> f32 {
    20.0
}
fn default_min_value() -> f32 {
    0.005
}
fn default_max_value() -> f32 {
    1.0
}
fn default_max_compression() -> f32 {
    0.25
}
fn default_min_flow() -> f32 {
    0.005
}
fn default_max_flow() -> f32 {
    4.0
}
fn default_flow_speed() -> f32 {
    1.0
}
fn default_color() -> [f32; 4] {
    [0.0, 1.0, 1.0, 0.8]
}
fn default_pressure_color() -> [f32; 4] {
    [0.0, 0.0, 1.0, 1.0]
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            block_id: default_block_id(),
            layer: 0,
            tick_hz: default_tick_hz(),
            min_value: default_min_value(),
            max_value: default_max_value(),
            max_compression: default_max_compression(),
            min_flow: default_min_flow(),
            max_flow: default_max_flow(),
            flow_speed: default_flow_speed(),
            vertical_only: false,
            color: default_color(),
            pressure_color: default_pressure_color(),
        }
    }
}

impl FluidConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tick_hz", self.tick_hz),
            ("max_value", self.max_value),
            ("max_flow", self.max_flow),
            ("flow_speed", self.flow_speed),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(1.0 / self.tick_hz).is_finite() {
            return Err(ConfigError::TickRate(self.tick_hz));
        }
        if !(self.min_value < self.max_value) {
            return Err(ConfigError::MinAboveMax {
                min: self.min_value,
                max: self.max_value,
            });
        }
        if !(self.max_compression >= 0.0) {
            return Err(ConfigError::NegativeCompression(self.max_compression));
        }
        if self.block_id == 0 {
            return Err(ConfigError::AirFluid);
        }
        Ok(())
    }
}
