//! Chunk storage, chunk coordinates and dense region snapshots.
#![forbid(unsafe_code)]

mod coord;

pub use coord::{BlockRect, ChunkCoord, ChunkShape};
use strata_blocks::Block;

/// Fixed-size block storage for one chunk, all layers in one linear buffer.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub layers: usize,
    pub blocks: Vec<Block>,
}

impl Chunk {
    pub fn new_empty(coord: ChunkCoord, shape: ChunkShape) -> Self {
        Self {
            coord,
            sx: shape.width,
            sy: shape.height,
            layers: shape.layers,
            blocks: vec![Block::AIR; shape.cells_per_layer() * shape.layers],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, layer: usize) -> usize {
        (layer * self.sy + y) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, layer: usize) -> Block {
        self.blocks[self.idx(x, y, layer)]
    }

    #[inline]
    pub fn get_local_mut(&mut self, x: usize, y: usize, layer: usize) -> &mut Block {
        let i = self.idx(x, y, layer);
        &mut self.blocks[i]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, layer: usize, block: Block) {
        let i = self.idx(x, y, layer);
        self.blocks[i] = block;
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_air())
    }
}

/// Copy of one layer over a block rectangle, row-major. Cells of chunks that
/// were not resident at capture time read as air.
#[derive(Clone, Debug)]
pub struct RegionSnapshot {
    pub rect: BlockRect,
    pub layer: usize,
    pub blocks: Vec<Block>,
}

impl RegionSnapshot {
    pub fn empty(rect: BlockRect, layer: usize) -> Self {
        Self {
            rect,
            layer,
            blocks: vec![Block::AIR; rect.area()],
        }
    }

    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        ((y - self.rect.y) * self.rect.w + (x - self.rect.x)) as usize
    }

    /// Block at world `(x, y)`; air outside the captured rectangle.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Block {
        if self.rect.contains(x, y) {
            self.blocks[self.index(x, y)]
        } else {
            Block::AIR
        }
    }

    /// Copies the overlap of `chunk`'s layer into the snapshot.
    pub fn copy_from_chunk(&mut self, chunk: &Chunk) {
        let bx = chunk.coord.cx * chunk.sx as i32;
        let by = chunk.coord.cy * chunk.sy as i32;
        let x0 = self.rect.x.max(bx);
        let x1 = self.rect.end_x().min(bx + chunk.sx as i32);
        let y0 = self.rect.y.max(by);
        let y1 = self.rect.end_y().min(by + chunk.sy as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.index(x, y);
                self.blocks[i] = chunk.get_local((x - bx) as usize, (y - by) as usize, self.layer);
            }
        }
    }
}
