//! Cellular-automaton liquid transport over one grid layer.
#![forbid(unsafe_code)]

mod config;
mod solver;

pub use config::{ConfigError, FluidConfig};
pub use solver::{FluidSolver, FluidTickStats, SETTLE_TICKS, vertical_flow};

#[cfg(test)]
mod tests;
