#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    #[inline]
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Axis-aligned rectangle in block units. `x..x+w` by `y..y+h`, y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BlockRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn end_x(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn end_y(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.end_x() && y >= self.y && y < self.end_y()
    }

    /// Rectangle inset by `n` blocks on every side. May come out empty.
    pub fn shrink(&self, n: i32) -> Self {
        Self {
            x: self.x + n,
            y: self.y + n,
            w: (self.w - 2 * n).max(0),
            h: (self.h - 2 * n).max(0),
        }
    }

    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.w as usize * self.h as usize
        }
    }
}

/// Chunk dimensions shared by every chunk of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkShape {
    pub width: usize,
    pub height: usize,
    pub layers: usize,
}

impl ChunkShape {
    pub const fn new(width: usize, height: usize, layers: usize) -> Self {
        Self {
            width,
            height,
            layers,
        }
    }

    #[inline]
    pub fn cells_per_layer(&self) -> usize {
        self.width * self.height
    }

    /// Panics on a layer index past the configured layer count.
    #[inline]
    pub fn check_layer(&self, layer: usize) {
        assert!(
            layer < self.layers,
            "layer {layer} out of range (grid has {} layers)",
            self.layers
        );
    }

    /// Chunk holding world block `(x, y)` plus the local offset inside it.
    /// Floor division, so `x = -1` lands in chunk `-1` at local `width - 1`.
    #[inline]
    pub fn locate(&self, x: i32, y: i32) -> (ChunkCoord, usize, usize) {
        let w = self.width as i32;
        let h = self.height as i32;
        (
            ChunkCoord::new(x.div_euclid(w), y.div_euclid(h)),
            x.rem_euclid(w) as usize,
            y.rem_euclid(h) as usize,
        )
    }

    #[inline]
    pub fn origin(&self, coord: ChunkCoord) -> (i32, i32) {
        (
            coord.cx * self.width as i32,
            coord.cy * self.height as i32,
        )
    }

    #[inline]
    pub fn world_of(&self, coord: ChunkCoord, lx: usize, ly: usize) -> (i32, i32) {
        let (bx, by) = self.origin(coord);
        (bx + lx as i32, by + ly as i32)
    }

    pub fn chunk_rect(&self, coord: ChunkCoord) -> BlockRect {
        let (bx, by) = self.origin(coord);
        BlockRect::new(bx, by, self.width as i32, self.height as i32)
    }

    /// Chunks that overlap `rect`, x-major then y.
    pub fn chunks_overlapping(&self, rect: BlockRect) -> Vec<ChunkCoord> {
        if rect.is_empty() {
            return Vec::new();
        }
        let w = self.width as i32;
        let h = self.height as i32;
        let cx0 = rect.x.div_euclid(w);
        let cy0 = rect.y.div_euclid(h);
        let cx1 = (rect.end_x() - 1).div_euclid(w);
        let cy1 = (rect.end_y() - 1).div_euclid(h);
        let mut out = Vec::with_capacity(((cx1 - cx0 + 1) * (cy1 - cy0 + 1)) as usize);
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                out.push(ChunkCoord::new(cx, cy));
            }
        }
        out
    }
}
