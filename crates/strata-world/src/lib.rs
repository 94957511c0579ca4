//! Chunk grid, viewport windowing and world generation.
#![forbid(unsafe_code)]

pub mod boundary;
pub mod config;
pub mod grid;
pub mod viewport;
pub mod worldgen;

pub use boundary::{BlockGenerator, NullSink, PresentationSink, ViewProvider};
pub use config::{ConfigError, GridConfig};
pub use grid::ChunkGrid;
pub use strata_chunk::{BlockRect, Chunk, ChunkCoord, ChunkShape, RegionSnapshot};
pub use viewport::{FrameDiff, ViewRect};
pub use worldgen::{NoiseGenerator, WorldGenConfig};
