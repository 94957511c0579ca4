pub type BlockId = u16;

/// Linear RGB triple used for emission and absorption.
pub type Rgb = [f32; 3];

/// One cell of one layer.
///
/// `liquid` is only meaningful for the configured fluid block id; other ids
/// keep it at zero. `settled` and `settle_count` are solver bookkeeping.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub liquid: f32,
    pub settled: bool,
    pub settle_count: u32,
}

impl Block {
    pub const AIR: Block = Block {
        id: 0,
        liquid: 0.0,
        settled: false,
        settle_count: 0,
    };

    #[inline]
    pub const fn new(id: BlockId) -> Self {
        Block {
            id,
            liquid: 0.0,
            settled: false,
            settle_count: 0,
        }
    }

    #[inline]
    pub const fn fluid(id: BlockId, liquid: f32) -> Self {
        Block {
            id,
            liquid,
            settled: false,
            settle_count: 0,
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == 0
    }

    /// Clears settle bookkeeping so the fluid solver processes the cell again.
    #[inline]
    pub fn wake(&mut self) {
        self.settled = false;
        self.settle_count = 0;
    }
}
