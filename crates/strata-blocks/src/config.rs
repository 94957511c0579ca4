use serde::Deserialize;

use crate::types::{BlockId, Rgb};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<BlockId>,
    #[serde(default)]
    pub solid: Option<bool>,
    #[serde(default)]
    pub emit_color: Option<Rgb>,
    #[serde(default)]
    pub emit_strength: Option<f32>,
    #[serde(default)]
    pub light_absorb: Option<LightAbsorb>,
}

/// Per-channel light multiplier, or one scalar applied to all channels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LightAbsorb {
    Scalar(f32),
    Rgb(Rgb),
}

impl LightAbsorb {
    pub fn to_rgb(self) -> Rgb {
        match self {
            LightAbsorb::Scalar(v) => [v, v, v],
            LightAbsorb::Rgb(c) => c,
        }
    }
}
