use std::collections::HashMap;
use std::error::Error;

use crate::config::{BlockDef, BlocksConfig};
use crate::types::{BlockId, Rgb};

/// Absorption used when a definition omits `light_absorb`.
pub const DEFAULT_OPEN_ABSORB: f32 = 0.9;
pub const DEFAULT_SOLID_ABSORB: f32 = 0.6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("block id {id} is defined by both '{first}' and '{second}'")]
    DuplicateId {
        id: BlockId,
        first: String,
        second: String,
    },
    #[error("block name '{0}' is defined twice")]
    DuplicateName(String),
    #[error("block '{name}': light_absorb {value} must lie in [0, 1]")]
    AbsorbOutOfRange { name: String, value: f32 },
    #[error("block '{name}': emission must be finite and non-negative")]
    InvalidEmission { name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockProps {
    pub id: BlockId,
    pub name: String,
    pub solid: bool,
    pub emit_color: Rgb,
    pub emit_strength: f32,
    pub light_absorb: Rgb,
}

impl BlockProps {
    pub fn air() -> Self {
        Self::placeholder(0, "air")
    }

    fn placeholder(id: BlockId, name: &str) -> Self {
        BlockProps {
            id,
            name: name.to_string(),
            solid: false,
            emit_color: [0.0; 3],
            emit_strength: 0.0,
            light_absorb: [DEFAULT_OPEN_ABSORB; 3],
        }
    }

    #[inline]
    pub fn emission(&self) -> Rgb {
        let c = self.emit_color;
        let s = self.emit_strength;
        [c[0] * s, c[1] * s, c[2] * s]
    }

    #[inline]
    pub fn is_emissive(&self) -> bool {
        self.emit_strength > 0.0 && self.emit_color.iter().any(|c| *c > 0.0)
    }

    fn from_def(def: &BlockDef, id: BlockId) -> Result<Self, RegistryError> {
        let solid = def.solid.unwrap_or(false);
        let default_absorb = if solid {
            DEFAULT_SOLID_ABSORB
        } else {
            DEFAULT_OPEN_ABSORB
        };
        let light_absorb = def
            .light_absorb
            .map(|a| a.to_rgb())
            .unwrap_or([default_absorb; 3]);
        for v in light_absorb {
            if !(0.0..=1.0).contains(&v) {
                return Err(RegistryError::AbsorbOutOfRange {
                    name: def.name.clone(),
                    value: v,
                });
            }
        }
        let emit_color = def.emit_color.unwrap_or([0.0; 3]);
        let emit_strength = def.emit_strength.unwrap_or(0.0);
        let emission_ok = emit_color
            .iter()
            .chain(std::iter::once(&emit_strength))
            .all(|v| v.is_finite() && *v >= 0.0);
        if !emission_ok {
            return Err(RegistryError::InvalidEmission {
                name: def.name.clone(),
            });
        }
        Ok(BlockProps {
            id,
            name: def.name.clone(),
            solid,
            emit_color,
            emit_strength,
            light_absorb,
        })
    }
}

/// Per-id block properties. Id 0 is always present and defaults to open air.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub blocks: Vec<BlockProps>,
    pub by_name: HashMap<String, BlockId>,
    fallback: BlockProps,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        let air = BlockProps::air();
        let mut by_name = HashMap::new();
        by_name.insert(air.name.clone(), 0);
        Self {
            blocks: vec![air.clone()],
            by_name,
            fallback: air,
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockProps> {
        self.blocks.get(id as usize)
    }

    /// Properties for `id`, falling back to open air for unknown ids.
    #[inline]
    pub fn properties(&self, id: BlockId) -> &BlockProps {
        self.blocks.get(id as usize).unwrap_or(&self.fallback)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(text)?;
        Ok(Self::from_config(&cfg)?)
    }

    /// Builds the registry. Definitions without an explicit id take the next
    /// free id after the highest one seen so far; gaps become air placeholders.
    pub fn from_config(cfg: &BlocksConfig) -> Result<Self, RegistryError> {
        Self::from_defs(&cfg.blocks)
    }

    pub fn from_defs(defs: &[BlockDef]) -> Result<Self, RegistryError> {
        let mut slots: Vec<Option<BlockProps>> = Vec::new();
        let mut by_name = HashMap::new();
        let mut next_id: BlockId = 1;
        for def in defs {
            let id = match def.id {
                Some(id) => id,
                None => {
                    while slots.get(next_id as usize).is_some_and(|s| s.is_some()) {
                        next_id += 1;
                    }
                    next_id
                }
            };
            if by_name.contains_key(&def.name) {
                return Err(RegistryError::DuplicateName(def.name.clone()));
            }
            let idx = id as usize;
            if slots.len() <= idx {
                slots.resize(idx + 1, None);
            }
            if let Some(existing) = &slots[idx] {
                return Err(RegistryError::DuplicateId {
                    id,
                    first: existing.name.clone(),
                    second: def.name.clone(),
                });
            }
            slots[idx] = Some(BlockProps::from_def(def, id)?);
            by_name.insert(def.name.clone(), id);
            next_id = next_id.max(id.saturating_add(1));
        }
        if slots.is_empty() {
            slots.push(None);
        }
        let mut blocks = Vec::with_capacity(slots.len());
        for (i, slot) in slots.into_iter().enumerate() {
            let props = match slot {
                Some(p) => p,
                None if i == 0 => {
                    by_name.entry("air".to_string()).or_insert(0);
                    BlockProps::air()
                }
                None => BlockProps::placeholder(i as BlockId, &format!("unknown_{i}")),
            };
            blocks.push(props);
        }
        Ok(Self {
            blocks,
            by_name,
            fallback: BlockProps::air(),
        })
    }
}
