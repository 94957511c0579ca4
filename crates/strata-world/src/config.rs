use serde::Deserialize;

use strata_chunk::ChunkShape;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("chunk dimensions must be in 1..=2147483647, got {width}x{height}")]
    ChunkSize { width: usize, height: usize },
    #[error("grid needs at least one layer")]
    NoLayers,
    #[error("block size must be positive and finite, got {0:?}")]
    BlockSize([f32; 2]),
    #[error("{what} layer {layer} is out of range (grid has {count} layers)")]
    LayerOutOfRange {
        what: &'static str,
        layer: usize,
        count: usize,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_chunk_width")]
    pub chunk_width: usize,
    #[serde(default = "default_chunk_height")]
    pub chunk_height: usize,
    /// Layer names; the count is the layer count. Index 0 is drawn in front.
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,
    /// World units per block.
    #[serde(default = "default_block_size")]
    pub block_size: [f32; 2],
    /// Extra chunks kept resident around the view on each side.
    #[serde(default = "default_padding")]
    pub padding: [u32; 2],
}

fn default_chunk_width() -> usize {
    16
}
fn default_chunk_height() -> usize {
    16
}
fn default_layers() -> Vec<String> {
    vec!["terrain".to_string(), "background".to_string()]
}
fn default_block_size() -> [f32; 2] {
    [16.0, 16.0]
}
fn default_padding() -> [u32; 2] {
    [1, 1]
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            chunk_width: default_chunk_width(),
            chunk_height: default_chunk_height(),
            layers: default_layers(),
            block_size: default_block_size(),
            padding: default_padding(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fits = |v: usize| v > 0 && v <= i32::MAX as usize;
        if !fits(self.chunk_width) || !fits(self.chunk_height) {
            return Err(ConfigError::ChunkSize {
                width: self.chunk_width,
                height: self.chunk_height,
            });
        }
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        if self.block_size.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        Ok(())
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l == name)
    }

    pub fn shape(&self) -> ChunkShape {
        ChunkShape::new(self.chunk_width, self.chunk_height, self.layers.len())
    }

    /// Errors when `layer` does not name one of the configured layers.
    pub fn check_layer(&self, what: &'static str, layer: usize) -> Result<(), ConfigError> {
        if layer >= self.layers.len() {
            return Err(ConfigError::LayerOutOfRange {
                what,
                layer,
                count: self.layers.len(),
            });
        }
        Ok(())
    }
}
