//! Background simulation loops and the frame-driven facade over them.
#![forbid(unsafe_code)]

mod fluid_loop;
mod light_loop;
mod worker;

use std::sync::Arc;

use strata_fluid::FluidSolver;
use strata_lighting::{LightField, LightSink, Lighting};
use strata_world::{ChunkGrid, FrameDiff, ViewProvider};

pub use fluid_loop::{FluidLoop, FluidTickReport};
pub use light_loop::LightLoop;
pub use worker::LoopStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationStatus {
    pub fluid: Option<LoopStatus>,
    pub lighting: Option<LoopStatus>,
}

impl SimulationStatus {
    pub fn any_stalled(&self) -> bool {
        self.fluid == Some(LoopStatus::Stalled) || self.lighting == Some(LoopStatus::Stalled)
    }
}

/// Owns the shared grid and whichever loops were enabled. The host calls
/// `frame` once per rendered frame; the loops run on their own threads.
pub struct Simulation {
    grid: Arc<ChunkGrid>,
    fluid: Option<FluidLoop>,
    lighting: Option<LightLoop>,
}

impl Simulation {
    pub fn start(
        grid: Arc<ChunkGrid>,
        fluid: Option<FluidSolver>,
        lighting: Option<Lighting>,
        light_sink: Option<Arc<dyn LightSink>>,
    ) -> Self {
        let fluid = fluid.map(FluidLoop::spawn);
        let lighting = lighting.map(|l| LightLoop::spawn(l, light_sink));
        log::info!(
            target: "runtime",
            "simulation started (fluid: {}, lighting: {})",
            fluid.is_some(),
            lighting.is_some()
        );
        Self {
            grid,
            fluid,
            lighting,
        }
    }

    pub fn grid(&self) -> &Arc<ChunkGrid> {
        &self.grid
    }

    /// Moves the visible window to the provider's current view.
    pub fn frame(&self, view: &dyn ViewProvider) -> FrameDiff {
        self.grid.advance_frame(view.current_view_rect())
    }

    pub fn drain_fluid_reports(&self) -> Vec<FluidTickReport> {
        self.fluid
            .as_ref()
            .map(|f| f.drain_reports())
            .unwrap_or_default()
    }

    pub fn latest_light_field(&self) -> Option<Arc<LightField>> {
        self.lighting.as_ref().and_then(|l| l.latest())
    }

    pub fn fluid_ticks(&self) -> u64 {
        self.fluid.as_ref().map_or(0, |f| f.ticks())
    }

    pub fn light_fields_computed(&self) -> u64 {
        self.lighting.as_ref().map_or(0, |l| l.computed())
    }

    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            fluid: self.fluid.as_ref().map(|f| f.status()),
            lighting: self.lighting.as_ref().map(|l| l.status()),
        }
    }

    /// Stops both loops and waits for their current ticks to complete.
    pub fn shutdown(self) {
        if let Some(f) = self.fluid {
            f.shutdown();
        }
        if let Some(l) = self.lighting {
            l.shutdown();
        }
        log::info!(target: "runtime", "simulation stopped");
    }
}

#[cfg(test)]
mod tests;
