//! Tile blocks and the block property registry.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{BlockProps, BlockRegistry, RegistryError};
pub use types::{Block, BlockId, Rgb};
