#![allow(missing_docs, dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use spanbuf::BufferPool;

/// Heap pool that records every rent and release.
#[derive(Debug, Default)]
pub struct CountingPool {
    rents: AtomicUsize,
    releases: AtomicUsize,
}

impl CountingPool {
    pub fn rents(&self) -> usize {
        self.rents.load(Ordering::Relaxed)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Stores rented and not yet released.
    pub fn outstanding(&self) -> usize {
        self.rents() - self.releases()
    }
}

impl<T: Copy + Default> BufferPool<T> for CountingPool {
    fn rent(&self, min_len: usize) -> Vec<T> {
        self.rents.fetch_add(1, Ordering::Relaxed);
        vec![T::default(); min_len]
    }

    fn release(&self, store: Vec<T>) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        drop(store);
    }
}
