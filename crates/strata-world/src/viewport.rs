use hashbrown::HashSet;

use strata_chunk::{BlockRect, ChunkCoord, ChunkShape};

/// Camera rectangle in world units (not blocks). y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewRect {
    pub pos: [f32; 2],
    pub size: [f32; 2],
}

impl ViewRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: [x, y],
            size: [w, h],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameDiff {
    /// Chunks visible this frame that were not visible last frame, x-major.
    pub entered: Vec<ChunkCoord>,
    /// Chunks that dropped out of view, sorted.
    pub left: Vec<ChunkCoord>,
}

impl FrameDiff {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// Chunk-aligned block rectangle covering `view`, padded by `padding` chunks
/// per side. The view's leading edge is floored and its trailing edge ceiled,
/// so any partially visible chunk is included.
pub fn window_for(
    view: ViewRect,
    shape: ChunkShape,
    block_size: [f32; 2],
    padding: [u32; 2],
) -> BlockRect {
    let chunk_w = shape.width as f32 * block_size[0];
    let chunk_h = shape.height as f32 * block_size[1];
    let w = view.size[0].max(0.0);
    let h = view.size[1].max(0.0);
    let pad_x = padding[0] as i32;
    let pad_y = padding[1] as i32;
    let cx0 = (view.pos[0] / chunk_w).floor() as i32 - pad_x;
    let cy0 = (view.pos[1] / chunk_h).floor() as i32 - pad_y;
    let cx1 = ((view.pos[0] + w) / chunk_w).ceil() as i32 + pad_x;
    let cy1 = ((view.pos[1] + h) / chunk_h).ceil() as i32 + pad_y;
    // A zero-sized view on a chunk boundary still owns the chunk it sits in.
    let cx1 = cx1.max(cx0 + 1 + 2 * pad_x);
    let cy1 = cy1.max(cy0 + 1 + 2 * pad_y);
    let sx = shape.width as i32;
    let sy = shape.height as i32;
    BlockRect::new(cx0 * sx, cy0 * sy, (cx1 - cx0) * sx, (cy1 - cy0) * sy)
}

/// Compares the previous visible set against the next one.
pub fn diff_visible(previous: &HashSet<ChunkCoord>, next: &[ChunkCoord]) -> FrameDiff {
    let next_set: HashSet<ChunkCoord> = next.iter().copied().collect();
    let entered = next
        .iter()
        .copied()
        .filter(|c| !previous.contains(c))
        .collect();
    let mut left: Vec<ChunkCoord> = previous
        .iter()
        .copied()
        .filter(|c| !next_set.contains(c))
        .collect();
    left.sort_unstable();
    FrameDiff { entered, left }
}
