//! Backing-store pools.
//!
//! A [`GrowableBuffer`](crate::GrowableBuffer) rents a store whenever it
//! outgrows its current one and releases the old store once its content has
//! been copied across. The pool is a collaborator: the buffer never assumes
//! anything about a rented store beyond its length.
//!
//! Two implementations ship with the crate:
//! - [`HeapPool`] allocates a fresh `Vec` for every rent and drops released
//!   stores. It is the default and has no state.
//! - [`SlabPool`] keeps released stores on a free list and hands them out
//!   again, so a hot loop that repeatedly builds strings of similar size stops
//!   allocating after warm-up.

use alloc::{sync::Arc, vec, vec::Vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::growth::MAX_CAPACITY;

/// Source of backing stores for [`GrowableBuffer`](crate::GrowableBuffer).
///
/// # Contract
/// - `rent(min_len)` returns a store whose `len()` is at least `min_len`.
///   Its content is unspecified.
/// - `release(store)` hands a store back. Releasing the same store twice is a
///   caller error; the buffer never does it.
/// - Implementations shared between threads must synchronise internally.
pub trait BufferPool<T> {
    /// Rents a store of at least `min_len` elements.
    fn rent(&self, min_len: usize) -> Vec<T>;

    /// Returns a previously rented store to the pool.
    fn release(&self, store: Vec<T>);
}

impl<T, P: BufferPool<T> + ?Sized> BufferPool<T> for &P {
    #[inline]
    fn rent(&self, min_len: usize) -> Vec<T> {
        (**self).rent(min_len)
    }

    #[inline]
    fn release(&self, store: Vec<T>) {
        (**self).release(store);
    }
}

/// Stateless pool that allocates on every rent and frees on every release.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapPool;

impl<T: Copy + Default> BufferPool<T> for HeapPool {
    #[inline]
    fn rent(&self, min_len: usize) -> Vec<T> {
        vec![T::default(); min_len]
    }

    #[inline]
    fn release(&self, store: Vec<T>) {
        drop(store);
    }
}

/// Smallest store a [`SlabPool`] hands out.
const MIN_SLAB_LEN: usize = 16;

/// Default number of released stores a [`SlabPool`] keeps for reuse.
const DEFAULT_MAX_RETAINED: usize = 32;

/// A free-list pool that recycles released stores.
///
/// Requests are rounded up to the next power of two (at least 16 elements) so
/// that stores of similar sizes are interchangeable. Renting takes the first
/// retained store that is large enough; releasing keeps the store unless the
/// free list already holds `max_retained` stores.
///
/// `SlabPool` is a cheap `Clone` handle; clones share the same free list.
pub struct SlabPool<T> {
    inner: Arc<SlabInner<T>>,
}

impl<T> Clone for SlabPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> core::fmt::Debug for SlabPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlabPool")
            .field("max_retained", &self.inner.max_retained)
            .field("statistics", &self.statistics())
            .finish()
    }
}

impl<T> Default for SlabPool<T> {
    fn default() -> Self {
        Self::with_max_retained(DEFAULT_MAX_RETAINED)
    }
}

/// Point-in-time counters of a [`SlabPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of `rent` calls.
    pub rents: usize,
    /// Total number of `release` calls.
    pub releases: usize,
    /// Rents served from the free list.
    pub reused: usize,
    /// Elements currently held on the free list.
    pub available_elements: usize,
    /// Stores currently held on the free list.
    pub available_stores: usize,
}

struct SlabInner<T> {
    free_list: Mutex<Vec<Vec<T>>>,
    max_retained: usize,
    rents: AtomicUsize,
    releases: AtomicUsize,
    reused: AtomicUsize,
}

impl<T> SlabPool<T> {
    /// Creates an empty pool with the default retention limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool that keeps at most `max_retained` released
    /// stores.
    #[must_use]
    pub fn with_max_retained(max_retained: usize) -> Self {
        Self {
            inner: Arc::new(SlabInner {
                free_list: Mutex::new(Vec::new()),
                max_retained,
                rents: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                reused: AtomicUsize::new(0),
            }),
        }
    }

    /// Drops every retained store and returns the number of elements freed.
    pub fn shrink_to_fit(&self) -> usize {
        let mut list = self.inner.free_list.lock();
        let freed = list.iter().map(Vec::len).sum();
        list.clear();
        freed
    }

    /// Snapshot of the pool counters.
    #[must_use]
    pub fn statistics(&self) -> PoolStats {
        let (available_stores, available_elements) = {
            let list = self.inner.free_list.lock();
            (list.len(), list.iter().map(Vec::len).sum())
        };
        PoolStats {
            rents: self.inner.rents.load(Ordering::Relaxed),
            releases: self.inner.releases.load(Ordering::Relaxed),
            reused: self.inner.reused.load(Ordering::Relaxed),
            available_elements,
            available_stores,
        }
    }
}

fn slab_len(min_len: usize) -> usize {
    match min_len.max(MIN_SLAB_LEN).checked_next_power_of_two() {
        Some(rounded) if rounded <= MAX_CAPACITY => rounded,
        _ => min_len,
    }
}

impl<T: Copy + Default> BufferPool<T> for SlabPool<T> {
    fn rent(&self, min_len: usize) -> Vec<T> {
        self.inner.rents.fetch_add(1, Ordering::Relaxed);

        let reused = {
            let mut list = self.inner.free_list.lock();
            list.iter()
                .position(|store| store.len() >= min_len)
                .map(|index| list.swap_remove(index))
        };

        match reused {
            Some(store) => {
                self.inner.reused.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(min_len, len = store.len(), "slab pool reused store");
                store
            }
            None => {
                let len = slab_len(min_len);
                tracing::trace!(min_len, len, "slab pool allocated store");
                vec![T::default(); len]
            }
        }
    }

    fn release(&self, store: Vec<T>) {
        self.inner.releases.fetch_add(1, Ordering::Relaxed);
        let mut list = self.inner.free_list.lock();
        if list.len() < self.inner.max_retained {
            tracing::trace!(len = store.len(), "slab pool retained store");
            list.push(store);
        }
    }
}
