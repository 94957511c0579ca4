use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;

use strata_blocks::{BlockProps, BlockRegistry, Rgb};
use strata_chunk::{BlockRect, RegionSnapshot};
use strata_world::ChunkGrid;

use crate::config::{ConfigError, LightingConfig};
use crate::field::LightField;

/// Absorption is raised to this power for diagonal steps.
pub const DIAGONAL_EXPONENT: f32 = 1.414;

/// Fluid amounts in this open range are skipped when picking a cell's
/// effective layer.
pub const TRANSITIONAL_LIQUID: (f32, f32) = (0.001, 0.5);

const EMISSION_EPSILON: f32 = 1e-6;

const NEIGHBORS: [(i32, i32, bool); 8] = [
    (1, 0, false),
    (-1, 0, false),
    (0, 1, false),
    (0, -1, false),
    (1, 1, true),
    (1, -1, true),
    (-1, 1, true),
    (-1, -1, true),
];

struct ColumnSeed {
    light: Vec<Rgb>,
    absorb: Vec<Rgb>,
}

pub struct Lighting {
    grid: Arc<ChunkGrid>,
    registry: Arc<BlockRegistry>,
    cfg: LightingConfig,
}

impl Lighting {
    pub fn new(
        grid: Arc<ChunkGrid>,
        registry: Arc<BlockRegistry>,
        cfg: LightingConfig,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        for &layer in &cfg.layers {
            if layer >= grid.layer_count() {
                return Err(strata_world::ConfigError::LayerOutOfRange {
                    what: "lighting",
                    layer,
                    count: grid.layer_count(),
                }
                .into());
            }
        }
        Ok(Self {
            grid,
            registry,
            cfg,
        })
    }

    pub fn config(&self) -> &LightingConfig {
        &self.cfg
    }

    pub fn grid(&self) -> &Arc<ChunkGrid> {
        &self.grid
    }

    /// Field for the grid's current visible window, if a frame has run.
    pub fn compute(&self) -> Option<LightField> {
        self.grid.visible_window().map(|w| self.compute_window(w))
    }

    pub fn compute_window(&self, window: BlockRect) -> LightField {
        let w = window.w.max(0) as usize;
        let h = window.h.max(0) as usize;
        let snaps: Vec<RegionSnapshot> = self
            .cfg
            .layers
            .iter()
            .map(|&layer| self.grid.snapshot_region(window, layer))
            .collect();

        let columns: Vec<ColumnSeed> = (0..w)
            .into_par_iter()
            .map(|i| self.seed_column(&snaps, window, window.x + i as i32))
            .collect();

        let channels = self.cfg.channels();
        let mut light = vec![vec![0.0f32; w * h]; channels];
        let mut absorb = vec![vec![0.0f32; w * h]; channels];
        for (i, col) in columns.iter().enumerate() {
            for j in 0..h {
                let idx = j * w + i;
                if channels == 1 {
                    light[0][idx] = mean(col.light[j]);
                    absorb[0][idx] = mean(col.absorb[j]);
                } else {
                    for c in 0..3 {
                        light[c][idx] = col.light[j][c];
                        absorb[c][idx] = col.absorb[j][c];
                    }
                }
            }
        }

        let threshold = self.cfg.light_threshold;
        light
            .par_iter_mut()
            .zip(absorb.par_iter())
            .for_each(|(plane, abs)| flood_channel(plane, abs, w, h, threshold));

        log::trace!(target: "lighting", "computed {}x{} field over {:?}", w, h, window);
        LightField::new(window, self.grid.block_size(), self.cfg.smooth, light)
    }

    /// First configured layer holding a settled, non-empty cell at `(x, y)`.
    fn effective_props(&self, snaps: &[RegionSnapshot], x: i32, y: i32) -> &BlockProps {
        let (lo, hi) = TRANSITIONAL_LIQUID;
        for snap in snaps {
            let b = snap.get(x, y);
            if b.id == 0 || (b.liquid > lo && b.liquid < hi) {
                continue;
            }
            return self.registry.properties(b.id);
        }
        self.registry.properties(0)
    }

    fn seed_column(&self, snaps: &[RegionSnapshot], window: BlockRect, x: i32) -> ColumnSeed {
        let h = window.h.max(0) as usize;
        let mut light = Vec::with_capacity(h);
        let mut absorb = Vec::with_capacity(h);
        let ambient = self.cfg.ambient_color.map(|c| c * self.cfg.ambient_strength);
        let mut blocked = false;
        for j in 0..h {
            let y = window.y + j as i32;
            let props = self.effective_props(snaps, x, y);
            if props.solid {
                blocked = true;
            }
            let emit = props.emission();
            let negligible = emit.iter().map(|c| c * c).sum::<f32>() < EMISSION_EPSILON;
            let seed = if negligible && !blocked {
                let f = self.cfg.ambient_falloff(y);
                ambient.map(|c| c * f)
            } else {
                emit
            };
            light.push(seed);
            absorb.push(props.light_absorb);
        }
        ColumnSeed { light, absorb }
    }
}

#[inline]
fn mean(c: Rgb) -> f32 {
    (c[0] + c[1] + c[2]) / 3.0
}

/// Multi-source flood fill of one channel in place. Every cell holding light
/// is a source; a neighbor is raised to `current * absorb` (absorb raised to
/// `DIAGONAL_EXPONENT` on diagonals) when that beats its value and reaches
/// `threshold`.
pub fn flood_channel(plane: &mut [f32], absorb: &[f32], w: usize, h: usize, threshold: f32) {
    let mut q: VecDeque<(usize, usize)> = VecDeque::new();
    for y in 0..h {
        for x in 0..w {
            if plane[y * w + x] > 0.0 {
                q.push_back((x, y));
            }
        }
    }
    while let Some((x, y)) = q.pop_front() {
        let level = plane[y * w + x];
        let mut try_push = |nx: i32, ny: i32, diagonal: bool| {
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                return;
            }
            let idx = ny as usize * w + nx as usize;
            let f = if diagonal {
                absorb[idx].powf(DIAGONAL_EXPONENT)
            } else {
                absorb[idx]
            };
            let v = level * f;
            if v > plane[idx] && v >= threshold {
                plane[idx] = v;
                q.push_back((nx as usize, ny as usize));
            }
        };
        for (dx, dy, diagonal) in NEIGHBORS {
            try_push(x as i32 + dx, y as i32 + dy, diagonal);
        }
    }
}
