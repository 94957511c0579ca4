use strata_blocks::Rgb;
use strata_chunk::BlockRect;

/// Light values over a block window, one row-major plane per channel.
/// A single-channel field reads back as gray.
#[derive(Clone, Debug)]
pub struct LightField {
    window: BlockRect,
    block_size: [f32; 2],
    smooth: bool,
    planes: Vec<Vec<f32>>,
}

impl LightField {
    pub fn new(
        window: BlockRect,
        block_size: [f32; 2],
        smooth: bool,
        planes: Vec<Vec<f32>>,
    ) -> Self {
        debug_assert!(planes.iter().all(|p| p.len() == window.area()));
        Self {
            window,
            block_size,
            smooth,
            planes,
        }
    }

    #[inline]
    pub fn window(&self) -> BlockRect {
        self.window
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.window.w.max(0) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.window.h.max(0) as usize
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// World-unit position of the window's top-left corner.
    #[inline]
    pub fn origin(&self) -> [f32; 2] {
        [
            self.window.x as f32 * self.block_size[0],
            self.window.y as f32 * self.block_size[1],
        ]
    }

    /// World-unit extent of the window.
    #[inline]
    pub fn world_size(&self) -> [f32; 2] {
        [
            self.window.w as f32 * self.block_size[0],
            self.window.h as f32 * self.block_size[1],
        ]
    }

    #[inline]
    pub fn plane(&self, channel: usize) -> &[f32] {
        &self.planes[channel]
    }

    #[inline]
    fn at_local(&self, lx: usize, ly: usize) -> Rgb {
        let i = ly * self.width() + lx;
        match self.planes.as_slice() {
            [v] => [v[i], v[i], v[i]],
            [r, g, b] => [r[i], g[i], b[i]],
            _ => [0.0; 3],
        }
    }

    /// Light at world block `(x, y)`; black outside the window.
    pub fn get(&self, x: i32, y: i32) -> Rgb {
        if !self.window.contains(x, y) {
            return [0.0; 3];
        }
        self.at_local((x - self.window.x) as usize, (y - self.window.y) as usize)
    }

    #[inline]
    fn clamped(&self, lx: i32, ly: i32) -> Rgb {
        let lx = lx.clamp(0, self.width() as i32 - 1) as usize;
        let ly = ly.clamp(0, self.height() as i32 - 1) as usize;
        self.at_local(lx, ly)
    }

    /// Light at a world-unit position: bilinear between cell centers when the
    /// field is smooth, nearest cell otherwise. Edges clamp.
    pub fn sample(&self, wx: f32, wy: f32) -> Rgb {
        if self.window.is_empty() {
            return [0.0; 3];
        }
        let [ox, oy] = self.origin();
        let bx = (wx - ox) / self.block_size[0];
        let by = (wy - oy) / self.block_size[1];
        if !self.smooth {
            return self.clamped(bx.floor() as i32, by.floor() as i32);
        }
        let fx = bx - 0.5;
        let fy = by - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);
        let a = self.clamped(x0, y0);
        let b = self.clamped(x0 + 1, y0);
        let c = self.clamped(x0, y0 + 1);
        let d = self.clamped(x0 + 1, y0 + 1);
        let mut out = [0.0; 3];
        for i in 0..3 {
            let top = a[i] + (b[i] - a[i]) * tx;
            let bottom = c[i] + (d[i] - c[i]) * tx;
            out[i] = top + (bottom - top) * ty;
        }
        out
    }

    /// Packed 8-bit image of the field, RGB or luminance by channel count.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.width() * self.height();
        let mut out = Vec::with_capacity(n * self.channels());
        for i in 0..n {
            for plane in &self.planes {
                out.push((plane[i].clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        out
    }

    pub fn max_value(&self) -> f32 {
        self.planes
            .iter()
            .flat_map(|p| p.iter().copied())
            .fold(0.0, f32::max)
    }
}
