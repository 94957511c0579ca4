use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};

use strata_blocks::{Block, BlockId};
use strata_chunk::{BlockRect, Chunk, ChunkCoord, ChunkShape, RegionSnapshot};

use crate::boundary::{BlockGenerator, NullSink, PresentationSink};
use crate::config::{ConfigError, GridConfig};
use crate::viewport::{self, FrameDiff, ViewRect};

type ChunkCell = Arc<RwLock<Chunk>>;

#[inline]
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct WindowState {
    rect: Option<BlockRect>,
    visible: HashSet<ChunkCoord>,
    order: Vec<ChunkCoord>,
}

/// Sparse map of chunks shared between the frame driver and the simulation
/// loops.
///
/// Lock order is always map then chunk. Readers never create chunks; every
/// write path creates the owning chunk first.
pub struct ChunkGrid {
    shape: ChunkShape,
    block_size: [f32; 2],
    padding: [u32; 2],
    generator: Arc<dyn BlockGenerator>,
    sink: Arc<dyn PresentationSink>,
    chunks: RwLock<HashMap<ChunkCoord, ChunkCell>>,
    window: RwLock<WindowState>,
    revision: AtomicU64,
}

impl ChunkGrid {
    pub fn new(cfg: &GridConfig, generator: Arc<dyn BlockGenerator>) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            shape: cfg.shape(),
            block_size: cfg.block_size,
            padding: cfg.padding,
            generator,
            sink: Arc::new(NullSink),
            chunks: RwLock::new(HashMap::new()),
            window: RwLock::new(WindowState::default()),
            revision: AtomicU64::new(0),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    #[inline]
    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.shape.layers
    }

    #[inline]
    pub fn block_size(&self) -> [f32; 2] {
        self.block_size
    }

    /// Bumped on every cell write, chunk creation and reset.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    #[inline]
    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    pub fn chunk_count(&self) -> usize {
        read_lock(&self.chunks).len()
    }

    pub fn contains_chunk(&self, coord: ChunkCoord) -> bool {
        read_lock(&self.chunks).contains_key(&coord)
    }

    /// Block at `(x, y, layer)`, or air when the chunk does not exist yet.
    pub fn get(&self, x: i32, y: i32, layer: usize) -> Block {
        self.shape.check_layer(layer);
        let (coord, lx, ly) = self.shape.locate(x, y);
        let map = read_lock(&self.chunks);
        match map.get(&coord) {
            Some(chunk) => read_lock(chunk).get_local(lx, ly, layer),
            None => Block::AIR,
        }
    }

    /// Mutates one cell in place, generating its chunk first if needed.
    pub fn update<R>(&self, x: i32, y: i32, layer: usize, f: impl FnOnce(&mut Block) -> R) -> R {
        self.shape.check_layer(layer);
        let (coord, lx, ly) = self.shape.locate(x, y);
        let chunk = self.chunk_for_write(coord);
        let out = {
            let mut guard = write_lock(&chunk);
            f(guard.get_local_mut(lx, ly, layer))
        };
        self.bump();
        out
    }

    /// Applies `f` to each listed cell, taking each chunk's write lock once.
    /// Positions should be unique.
    pub fn update_batch<T>(
        &self,
        layer: usize,
        edits: impl IntoIterator<Item = ((i32, i32), T)>,
        mut f: impl FnMut(&mut Block, T),
    ) -> usize {
        self.shape.check_layer(layer);
        let mut by_chunk: HashMap<ChunkCoord, Vec<(usize, usize, T)>> = HashMap::new();
        for ((x, y), edit) in edits {
            let (coord, lx, ly) = self.shape.locate(x, y);
            by_chunk.entry(coord).or_default().push((lx, ly, edit));
        }
        let mut applied = 0;
        for (coord, cells) in by_chunk {
            let chunk = self.chunk_for_write(coord);
            let mut guard = write_lock(&chunk);
            for (lx, ly, edit) in cells {
                f(guard.get_local_mut(lx, ly, layer), edit);
                applied += 1;
            }
        }
        if applied > 0 {
            self.bump();
        }
        applied
    }

    /// Overwrites one cell and notifies the sink for the owning chunk.
    pub fn set(&self, x: i32, y: i32, layer: usize, block: Block) {
        self.update(x, y, layer, |b| *b = block);
        let (coord, _, _) = self.shape.locate(x, y);
        self.notify_updated(coord);
    }

    pub fn set_id(&self, x: i32, y: i32, layer: usize, id: BlockId) {
        self.set(x, y, layer, Block::new(id));
    }

    /// Creates and generates the chunk at `coord` if absent. Returns whether a
    /// chunk was created by this call.
    pub fn ensure_chunk_present(&self, coord: ChunkCoord) -> bool {
        if read_lock(&self.chunks).contains_key(&coord) {
            return false;
        }
        let created = {
            let mut map = write_lock(&self.chunks);
            match map.entry(coord) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    let chunk = self.generate_chunk(coord);
                    slot.insert(Arc::new(RwLock::new(chunk)));
                    true
                }
            }
        };
        if created {
            self.bump();
            log::debug!(target: "grid", "generated chunk ({}, {})", coord.cx, coord.cy);
            self.sink.on_chunk_generated(coord);
        }
        created
    }

    fn generate_chunk(&self, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::new_empty(coord, self.shape);
        for layer in 0..self.shape.layers {
            for ly in 0..self.shape.height {
                for lx in 0..self.shape.width {
                    let (wx, wy) = self.shape.world_of(coord, lx, ly);
                    let id = self.generator.generate(layer, wx, wy);
                    if id != 0 {
                        chunk.set_local(lx, ly, layer, Block::new(id));
                    }
                }
            }
        }
        chunk
    }

    fn chunk_for_write(&self, coord: ChunkCoord) -> ChunkCell {
        loop {
            if let Some(chunk) = read_lock(&self.chunks).get(&coord) {
                return Arc::clone(chunk);
            }
            // A concurrent reset may remove the chunk between creation and lookup.
            self.ensure_chunk_present(coord);
        }
    }

    fn notify_updated(&self, coord: ChunkCoord) {
        let chunk = read_lock(&self.chunks).get(&coord).cloned();
        if let Some(chunk) = chunk {
            let guard = read_lock(&chunk);
            self.sink.on_chunk_updated(coord, &guard);
        }
    }

    /// Drops every chunk and the visible-window history.
    pub fn reset(&self) {
        let dropped = {
            let mut map = write_lock(&self.chunks);
            let n = map.len();
            map.clear();
            n
        };
        *write_lock(&self.window) = WindowState::default();
        self.bump();
        log::info!(target: "grid", "reset grid, dropped {dropped} chunks");
    }

    /// Padded, chunk-aligned block rectangle for a view.
    pub fn window_for(&self, view: ViewRect) -> BlockRect {
        viewport::window_for(view, self.shape, self.block_size, self.padding)
    }

    pub fn compute_visible_chunks(&self, view: ViewRect) -> Vec<ChunkCoord> {
        self.shape.chunks_overlapping(self.window_for(view))
    }

    /// Moves the visible window to `view`. Newly visible chunks are created and
    /// reported as updated; chunks that left the view are reported as cleared.
    pub fn advance_frame(&self, view: ViewRect) -> FrameDiff {
        let window = self.window_for(view);
        let next = self.shape.chunks_overlapping(window);
        let diff = {
            let mut state = write_lock(&self.window);
            let diff = viewport::diff_visible(&state.visible, &next);
            state.visible = next.iter().copied().collect();
            state.order = next;
            state.rect = Some(window);
            diff
        };
        for &coord in &diff.entered {
            self.ensure_chunk_present(coord);
            self.notify_updated(coord);
        }
        for &coord in &diff.left {
            self.sink.on_chunk_cleared(self.shape.chunk_rect(coord));
        }
        if !diff.is_empty() {
            log::trace!(
                target: "grid",
                "frame window {:?}: {} entered, {} left",
                window,
                diff.entered.len(),
                diff.left.len()
            );
        }
        diff
    }

    /// Re-sends `on_chunk_updated` for every visible chunk that exists.
    pub fn refresh_visible(&self) {
        let order = read_lock(&self.window).order.clone();
        for coord in order {
            self.notify_updated(coord);
        }
    }

    pub fn visible_window(&self) -> Option<BlockRect> {
        read_lock(&self.window).rect
    }

    pub fn visible_chunks(&self) -> Vec<ChunkCoord> {
        read_lock(&self.window).order.clone()
    }

    /// Dense copy of one layer over `rect`. Missing chunks read as air and are
    /// not created.
    pub fn snapshot_region(&self, rect: BlockRect, layer: usize) -> RegionSnapshot {
        self.shape.check_layer(layer);
        let mut snap = RegionSnapshot::empty(rect, layer);
        if rect.is_empty() {
            return snap;
        }
        let map = read_lock(&self.chunks);
        for coord in self.shape.chunks_overlapping(rect) {
            if let Some(chunk) = map.get(&coord) {
                snap.copy_from_chunk(&read_lock(chunk));
            }
        }
        snap
    }

    pub fn chunk_snapshot(&self, coord: ChunkCoord) -> Option<Chunk> {
        let map = read_lock(&self.chunks);
        map.get(&coord).map(|c| read_lock(c).clone())
    }
}
