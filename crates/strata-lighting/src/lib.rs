//! 2D light field from block emission, sky ambient and per-channel absorption.
#![forbid(unsafe_code)]

mod config;
mod field;
mod propagate;

use std::sync::Arc;

pub use config::{ConfigError, LightingConfig};
pub use field::LightField;
pub use propagate::{DIAGONAL_EXPONENT, Lighting, TRANSITIONAL_LIQUID, flood_channel};

/// Receives each freshly computed field.
pub trait LightSink: Send + Sync {
    fn on_light_field(&self, field: Arc<LightField>);
}

#[cfg(test)]
mod tests;
