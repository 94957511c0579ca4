use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

use strata_blocks::BlockId;

use crate::boundary::BlockGenerator;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    /// Mean surface row. Rows grow downward.
    #[serde(default = "default_surface_row")]
    pub surface_row: i32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_dirt_depth")]
    pub dirt_depth: i32,
    #[serde(default)]
    pub ids: GenIds,
    #[serde(default)]
    pub water: Water,
    #[serde(default)]
    pub lamps: Lamps,
    #[serde(default = "default_terrain_layer")]
    pub terrain_layer: usize,
    /// Layer that receives solid backdrop below the surface; `None` disables it.
    #[serde(default = "default_background_layer")]
    pub background_layer: Option<usize>,
}

fn default_seed() -> i32 {
    1337
}
fn default_surface_row() -> i32 {
    24
}
fn default_amplitude() -> f32 {
    10.0
}
fn default_frequency() -> f32 {
    0.02
}
fn default_dirt_depth() -> i32 {
    4
}
fn default_terrain_layer() -> usize {
    0
}
fn default_background_layer() -> Option<usize> {
    Some(1)
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            surface_row: default_surface_row(),
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            dirt_depth: default_dirt_depth(),
            ids: GenIds::default(),
            water: Water::default(),
            lamps: Lamps::default(),
            terrain_layer: default_terrain_layer(),
            background_layer: default_background_layer(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenIds {
    #[serde(default = "default_stone")]
    pub stone: BlockId,
    #[serde(default = "default_dirt")]
    pub dirt: BlockId,
}
fn default_stone() -> BlockId {
    1
}
fn default_dirt() -> BlockId {
    2
}
impl Default for GenIds {
    fn default() -> Self {
        Self {
            stone: default_stone(),
            dirt: default_dirt(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Water {
    #[serde(default = "default_water_enable")]
    pub enable: bool,
    #[serde(default = "default_water_id")]
    pub id: BlockId,
    /// Open cells at or below this row on the terrain layer fill with fluid.
    #[serde(default = "default_sea_row")]
    pub sea_row: i32,
}
fn default_water_enable() -> bool {
    true
}
fn default_water_id() -> BlockId {
    3
}
fn default_sea_row() -> i32 {
    28
}
impl Default for Water {
    fn default() -> Self {
        Self {
            enable: default_water_enable(),
            id: default_water_id(),
            sea_row: default_sea_row(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lamps {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "default_lamp_id")]
    pub id: BlockId,
    /// Place a lamp on the surface every `spacing` columns.
    #[serde(default = "default_lamp_spacing")]
    pub spacing: i32,
}
fn default_lamp_id() -> BlockId {
    4
}
fn default_lamp_spacing() -> i32 {
    24
}
impl Default for Lamps {
    fn default() -> Self {
        Self {
            enable: false,
            id: default_lamp_id(),
            spacing: default_lamp_spacing(),
        }
    }
}

/// Height-profile terrain: air above the surface, dirt, then stone, with a
/// sea filling open cells below `water.sea_row`.
pub struct NoiseGenerator {
    cfg: WorldGenConfig,
    terrain: FastNoiseLite,
}

impl NoiseGenerator {
    pub fn new(cfg: WorldGenConfig) -> Self {
        let mut terrain = FastNoiseLite::with_seed(cfg.seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(cfg.frequency));
        Self { cfg, terrain }
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.cfg
    }

    /// First solid row of column `wx`.
    #[inline]
    pub fn surface_at(&self, wx: i32) -> i32 {
        let n = self.terrain.get_noise_2d(wx as f32, 0.0);
        self.cfg.surface_row + (n * self.cfg.amplitude).round() as i32
    }

    fn terrain_block(&self, wx: i32, wy: i32, surface: i32) -> BlockId {
        let cfg = &self.cfg;
        if wy >= surface {
            return if wy < surface + cfg.dirt_depth {
                cfg.ids.dirt
            } else {
                cfg.ids.stone
            };
        }
        if cfg.water.enable && wy >= cfg.water.sea_row {
            return cfg.water.id;
        }
        if cfg.lamps.enable
            && cfg.lamps.spacing > 0
            && wy == surface - 1
            && wx.rem_euclid(cfg.lamps.spacing) == 0
        {
            return cfg.lamps.id;
        }
        0
    }
}

impl BlockGenerator for NoiseGenerator {
    fn generate(&self, layer: usize, wx: i32, wy: i32) -> BlockId {
        let surface = self.surface_at(wx);
        if layer == self.cfg.terrain_layer {
            self.terrain_block(wx, wy, surface)
        } else if Some(layer) == self.cfg.background_layer
            && wy >= surface + self.cfg.dirt_depth / 2
        {
            self.cfg.ids.stone
        } else {
            0
        }
    }
}
