use std::sync::Arc;

use hashbrown::HashMap;

use strata_blocks::Block;
use strata_chunk::{BlockRect, RegionSnapshot};
use strata_world::ChunkGrid;

use crate::config::{ConfigError, FluidConfig};

/// Consecutive unchanged ticks before a cell is marked settled.
pub const SETTLE_TICKS: u32 = 10;

/// Amount the lower of two vertically stacked cells should hold when their
/// combined liquid is `remaining + dest`.
#[inline]
pub fn vertical_flow(remaining: f32, dest: f32, max_value: f32, max_compression: f32) -> f32 {
    let sum = remaining + dest;
    if sum <= max_value {
        max_value
    } else if sum < 2.0 * max_value + max_compression {
        (max_value * max_value + sum * max_compression) / (max_value + max_compression)
    } else {
        (sum + max_compression) / 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidTickStats {
    /// Fluid cells visited.
    pub scanned: usize,
    /// Cells that ran the flow rules.
    pub active: usize,
    /// Cells skipped because they were already settled.
    pub settled: usize,
    /// Cells emptied for holding less than `min_value`.
    pub drained: usize,
    /// Cells written in the apply pass.
    pub changes: usize,
    /// Liquid held by fluid cells of the window before the tick.
    pub total_liquid: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct CellDelta {
    liquid: f32,
    wake: bool,
    settle: Option<(u32, bool)>,
}

/// One tick's worth of buffered edits, keyed by absolute block position.
#[derive(Default)]
struct DeltaMap {
    cells: HashMap<(i32, i32), CellDelta>,
}

impl DeltaMap {
    #[inline]
    fn at(&mut self, x: i32, y: i32) -> &mut CellDelta {
        self.cells.entry((x, y)).or_default()
    }

    #[inline]
    fn transfer(&mut self, from: (i32, i32), to: (i32, i32), amount: f32) {
        self.at(from.0, from.1).liquid -= amount;
        let dest = self.at(to.0, to.1);
        dest.liquid += amount;
        dest.wake = true;
    }
}

pub struct FluidSolver {
    grid: Arc<ChunkGrid>,
    cfg: FluidConfig,
}

impl FluidSolver {
    pub fn new(grid: Arc<ChunkGrid>, cfg: FluidConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        if cfg.layer >= grid.layer_count() {
            return Err(strata_world::ConfigError::LayerOutOfRange {
                what: "fluid",
                layer: cfg.layer,
                count: grid.layer_count(),
            }
            .into());
        }
        Ok(Self { grid, cfg })
    }

    pub fn config(&self) -> &FluidConfig {
        &self.cfg
    }

    pub fn grid(&self) -> &Arc<ChunkGrid> {
        &self.grid
    }

    #[inline]
    fn vertical(&self, remaining: f32, dest: f32) -> f32 {
        vertical_flow(remaining, dest, self.cfg.max_value, self.cfg.max_compression)
    }

    #[inline]
    fn accepts(&self, block: Block) -> bool {
        block.id == 0 || block.id == self.cfg.block_id
    }

    /// Speeds up a flow above `min_flow`, then clamps it to `[0, min(max_flow, budget)]`.
    #[inline]
    fn shape_flow(&self, flow: f32, budget: f32) -> f32 {
        let flow = if flow > self.cfg.min_flow {
            flow * self.cfg.flow_speed
        } else {
            flow
        };
        flow.max(0.0).min(self.cfg.max_flow.min(budget))
    }

    /// Runs one tick over the current visible window. No-op before the first frame.
    pub fn tick(&self) -> FluidTickStats {
        match self.grid.visible_window() {
            Some(window) => self.tick_region(window),
            None => FluidTickStats::default(),
        }
    }

    /// Runs one tick over `window`. The outermost ring of cells is read as
    /// neighbors but never processed.
    pub fn tick_region(&self, window: BlockRect) -> FluidTickStats {
        let mut stats = FluidTickStats::default();
        let inner = window.shrink(1);
        if inner.is_empty() {
            return stats;
        }
        let snap = self.grid.snapshot_region(window, self.cfg.layer);
        let mut deltas = DeltaMap::default();
        for x in inner.x..inner.end_x() {
            for y in inner.y..inner.end_y() {
                self.step_cell(&snap, x, y, &mut deltas, &mut stats);
            }
        }
        stats.changes = self.apply(deltas);
        log::trace!(target: "fluid", "tick {:?}", stats);
        stats
    }

    fn step_cell(
        &self,
        snap: &RegionSnapshot,
        x: i32,
        y: i32,
        deltas: &mut DeltaMap,
        stats: &mut FluidTickStats,
    ) {
        let cell = snap.get(x, y);
        if cell.id != self.cfg.block_id {
            return;
        }
        stats.scanned += 1;
        stats.total_liquid += cell.liquid;

        let mut liquid = cell.liquid;
        if liquid == 0.0 {
            liquid = 1.0;
            deltas.at(x, y).liquid += 1.0;
        }
        if liquid < self.cfg.min_value {
            deltas.at(x, y).liquid -= liquid;
            stats.drained += 1;
            return;
        }
        if cell.settled {
            stats.settled += 1;
            return;
        }
        stats.active += 1;

        let here = (x, y);
        let below = snap.get(x, y + 1);

        if self.cfg.vertical_only {
            // The cell empties and the one below becomes a full cell.
            if below.id == 0 {
                deltas.at(x, y).liquid -= liquid;
                let dest = deltas.at(x, y + 1);
                dest.liquid += 1.0 - below.liquid;
                dest.wake = true;
            }
            return;
        }

        let start = liquid;
        let mut remaining = liquid;

        if self.accepts(below) {
            let flow = self.vertical(liquid, below.liquid) - below.liquid;
            let flow = self.shape_flow(flow, liquid);
            if flow != 0.0 {
                remaining -= flow;
                deltas.transfer(here, (x, y + 1), flow);
            }
        }
        if self.drain_residual(deltas, here, remaining, stats) {
            return;
        }

        let left = snap.get(x - 1, y);
        if self.accepts(left) {
            let flow = self.shape_flow((remaining - left.liquid) / 4.0, remaining);
            if flow != 0.0 {
                remaining -= flow;
                deltas.transfer(here, (x - 1, y), flow);
            }
        }
        if self.drain_residual(deltas, here, remaining, stats) {
            return;
        }

        let right = snap.get(x + 1, y);
        if self.accepts(right) {
            let flow = self.shape_flow((remaining - right.liquid) / 3.0, remaining);
            if flow != 0.0 {
                remaining -= flow;
                deltas.transfer(here, (x + 1, y), flow);
            }
        }
        if self.drain_residual(deltas, here, remaining, stats) {
            return;
        }

        let above = snap.get(x, y - 1);
        if self.accepts(above) {
            let flow = remaining - self.vertical(remaining, above.liquid);
            let flow = self.shape_flow(flow, remaining);
            if flow != 0.0 {
                remaining -= flow;
                deltas.transfer(here, (x, y - 1), flow);
            }
        }
        if self.drain_residual(deltas, here, remaining, stats) {
            return;
        }

        if start == remaining {
            let count = cell.settle_count + 1;
            deltas.at(x, y).settle = Some((count, count >= SETTLE_TICKS));
        } else {
            deltas.at(x, y).settle = Some((0, false));
            for (nx, ny) in [(x, y - 1), (x, y + 1), (x - 1, y), (x + 1, y)] {
                deltas.at(nx, ny).wake = true;
            }
        }
    }

    /// Removes whatever is left in a cell that fell under `min_value`.
    #[inline]
    fn drain_residual(
        &self,
        deltas: &mut DeltaMap,
        (x, y): (i32, i32),
        remaining: f32,
        stats: &mut FluidTickStats,
    ) -> bool {
        if remaining < self.cfg.min_value {
            deltas.at(x, y).liquid -= remaining;
            stats.drained += 1;
            true
        } else {
            false
        }
    }

    fn apply(&self, deltas: DeltaMap) -> usize {
        if deltas.cells.is_empty() {
            return 0;
        }
        let fluid = self.cfg.block_id;
        let min_value = self.cfg.min_value;
        self.grid
            .update_batch(self.cfg.layer, deltas.cells, |block, delta| {
                block.liquid = (block.liquid + delta.liquid).max(0.0);
                if let Some((count, settled)) = delta.settle {
                    block.settle_count = count;
                    block.settled = settled;
                }
                // A neighbor's flow this tick overrides the cell's own settle bookkeeping.
                if delta.wake {
                    block.wake();
                }
                if block.id == fluid && block.liquid < min_value {
                    block.id = 0;
                    block.wake();
                } else if block.id == 0 && block.liquid >= min_value {
                    block.id = fluid;
                }
            })
    }

    /// Presentation color for a fluid cell: the base color with alpha raised to
    /// the fill level, shading toward `pressure_color` when compressed.
    pub fn tint(&self, block: &Block) -> Option<[f32; 4]> {
        if block.id != self.cfg.block_id {
            return None;
        }
        let mut color = self.cfg.color;
        color[3] = block.liquid.max(color[3]);
        if block.liquid > self.cfg.max_value {
            let span = self.cfg.max_flow - self.cfg.max_value;
            let t = if span > 0.0 {
                ((block.liquid - self.cfg.max_value) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            for (c, p) in color.iter_mut().zip(self.cfg.pressure_color) {
                *c += (p - *c) * t;
            }
        }
        Some(color)
    }
}
