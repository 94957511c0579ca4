use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use strata_blocks::config::{BlockDef, LightAbsorb};
use strata_blocks::{BlockRegistry, RegistryError};
use strata_fluid::FluidConfig;
use strata_lighting::LightingConfig;
use strata_world::{GridConfig, WorldGenConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Grid(#[from] strata_world::ConfigError),
    #[error(transparent)]
    Fluid(#[from] strata_fluid::ConfigError),
    #[error(transparent)]
    Lighting(#[from] strata_lighting::ConfigError),
    #[error(transparent)]
    Blocks(#[from] RegistryError),
    #[error("view size must look like WIDTHxHEIGHT with positive numbers, got '{0}'")]
    ViewSize(String),
    #[error("runtime stats_every must be at least 1")]
    StatsInterval,
}

/// Everything the driver reads from one TOML file. Every section is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub fluid: FluidConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_true")]
    pub fluid: bool,
    #[serde(default = "default_true")]
    pub lighting: bool,
    /// Log a stats line every N frames.
    #[serde(default = "default_stats_every")]
    pub stats_every: u32,
}

fn default_true() -> bool {
    true
}
fn default_stats_every() -> u32 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fluid: true,
            lighting: true,
            stats_every: default_stats_every(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Checks every section and the layer references between them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.fluid.validate()?;
        self.lighting.validate()?;
        self.grid.check_layer("fluid", self.fluid.layer)?;
        for &layer in &self.lighting.layers {
            self.grid.check_layer("lighting", layer)?;
        }
        self.grid.check_layer("worldgen terrain", self.worldgen.terrain_layer)?;
        if let Some(layer) = self.worldgen.background_layer {
            self.grid.check_layer("worldgen background", layer)?;
        }
        if self.runtime.stats_every == 0 {
            return Err(ConfigError::StatsInterval);
        }
        Ok(())
    }

    /// Registry from `[[blocks]]`, or the built-in palette when none are given.
    pub fn registry(&self) -> Result<BlockRegistry, ConfigError> {
        if self.blocks.is_empty() {
            Ok(BlockRegistry::from_defs(&default_blocks())?)
        } else {
            Ok(BlockRegistry::from_defs(&self.blocks)?)
        }
    }
}

fn block(name: &str, id: u16, solid: bool, absorb: LightAbsorb) -> BlockDef {
    BlockDef {
        name: name.to_string(),
        id: Some(id),
        solid: Some(solid),
        emit_color: None,
        emit_strength: None,
        light_absorb: Some(absorb),
    }
}

/// Palette matching the default worldgen ids.
pub fn default_blocks() -> Vec<BlockDef> {
    let mut lamp = block("lamp", 4, true, LightAbsorb::Scalar(0.8));
    lamp.emit_color = Some([1.0, 0.85, 0.6]);
    lamp.emit_strength = Some(1.5);
    vec![
        block("air", 0, false, LightAbsorb::Scalar(0.9)),
        block("stone", 1, true, LightAbsorb::Scalar(0.3)),
        block("dirt", 2, true, LightAbsorb::Scalar(0.4)),
        block("water", 3, false, LightAbsorb::Rgb([0.6, 0.8, 0.95])),
        lamp,
    ]
}

/// Parses `--view 1280x720`.
pub fn parse_view(s: &str) -> Result<[f32; 2], ConfigError> {
    let bad = || ConfigError::ViewSize(s.to_string());
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(bad)?;
    let w: f32 = w.trim().parse().map_err(|_| bad())?;
    let h: f32 = h.trim().parse().map_err(|_| bad())?;
    if !(w > 0.0 && h > 0.0) || !w.is_finite() || !h.is_finite() {
        return Err(bad());
    }
    Ok([w, h])
}
