use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use strata_lighting::{LightField, LightSink};
use strata_world::{BlockRect, Chunk, ChunkCoord, PresentationSink};

/// Counts grid notifications in place of a renderer.
#[derive(Default)]
pub struct CountingSink {
    pub generated: AtomicUsize,
    pub updated: AtomicUsize,
    pub cleared: AtomicUsize,
}

impl PresentationSink for CountingSink {
    fn on_chunk_generated(&self, _coord: ChunkCoord) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    fn on_chunk_updated(&self, coord: ChunkCoord, chunk: &Chunk) {
        self.updated.fetch_add(1, Ordering::Relaxed);
        log::trace!(
            target: "grid",
            "chunk ({}, {}) updated, populated={}",
            coord.cx,
            coord.cy,
            chunk.has_non_air()
        );
    }

    fn on_chunk_cleared(&self, region: BlockRect) {
        self.cleared.fetch_add(1, Ordering::Relaxed);
        log::trace!(target: "grid", "cleared {:?}", region);
    }
}

impl CountingSink {
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.generated.load(Ordering::Relaxed),
            self.updated.load(Ordering::Relaxed),
            self.cleared.load(Ordering::Relaxed),
        )
    }
}

/// Keeps the newest light field for the stats line.
#[derive(Default)]
pub struct LatestField {
    field: Mutex<Option<Arc<LightField>>>,
    received: AtomicUsize,
}

impl LightSink for LatestField {
    fn on_light_field(&self, field: Arc<LightField>) {
        self.received.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut slot) = self.field.lock() {
            *slot = Some(field);
        }
    }
}

impl LatestField {
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }

    pub fn latest(&self) -> Option<Arc<LightField>> {
        self.field.lock().ok().and_then(|slot| slot.clone())
    }
}
