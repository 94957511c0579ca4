use strata_blocks::BlockId;
use strata_chunk::{BlockRect, Chunk, ChunkCoord};

use crate::viewport::ViewRect;

/// Procedural content policy. Called once per cell and layer when a chunk is
/// first created; must be pure and must not call back into the grid.
pub trait BlockGenerator: Send + Sync {
    fn generate(&self, layer: usize, wx: i32, wy: i32) -> BlockId;
}

impl<F> BlockGenerator for F
where
    F: Fn(usize, i32, i32) -> BlockId + Send + Sync,
{
    #[inline]
    fn generate(&self, layer: usize, wx: i32, wy: i32) -> BlockId {
        self(layer, wx, wy)
    }
}

pub trait ViewProvider {
    fn current_view_rect(&self) -> ViewRect;
}

impl ViewProvider for ViewRect {
    fn current_view_rect(&self) -> ViewRect {
        *self
    }
}

/// Receives grid change notifications. Calls are fire-and-forget and may
/// arrive from any thread that writes the grid.
pub trait PresentationSink: Send + Sync {
    fn on_chunk_generated(&self, _coord: ChunkCoord) {}
    fn on_chunk_updated(&self, _coord: ChunkCoord, _chunk: &Chunk) {}
    fn on_chunk_cleared(&self, _region: BlockRect) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}
