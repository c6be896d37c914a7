//! Growable buffer backed by a caller-supplied view or a pooled store.
//!
//! Overview
//! - A [`GrowableBuffer`] starts on whatever memory the caller hands it,
//!   typically a fixed-size array on the stack sized for the common case. As
//!   long as content fits, no allocation happens at all.
//! - When a mutation needs more room, [`growth::next_capacity`] picks a new
//!   capacity, a store is rented from the [`BufferPool`], live content is
//!   copied across and the previous store, if it came from the pool, is
//!   released. A caller-supplied view is simply dropped from the buffer: it
//!   never belonged to the pool.
//!
//! Invariants
//! - `len <= capacity` at all times.
//! - `[0, len)` is content. `[len, capacity)` is scratch whose values are
//!   unspecified; no read accessor exposes it.
//! - Exactly one store is referenced. A pooled store is released exactly once,
//!   after its content has been copied out, and is never touched afterwards.
//!
//! Ownership
//! - The `'a` lifetime ties a buffer to the view it was created from, so a
//!   buffer over stack memory cannot escape the frame owning that memory.
//! - Disposal is [`Drop`]. [`GrowableBuffer::dispose`] is the explicit
//!   spelling; it consumes the buffer, so use-after-dispose does not compile.
//!
//! Errors
//! - Range and argument checks run before any write: a call that fails with
//!   [`BuilderError::ArgumentOutOfRange`] or [`BuilderError::InvalidArgument`]
//!   leaves the buffer untouched.
//! - Growth past [`MAX_CAPACITY`] fails with
//!   [`BuilderError::CapacityExceeded`].

mod text;

#[cfg(test)]
mod tests;

use alloc::vec::Vec;
use core::{
    cmp::Ordering,
    fmt, mem,
    ops::{Deref, DerefMut},
};

use crate::{
    Result,
    error::BuilderError,
    growth::{self, MAX_CAPACITY},
    options::TrimPolicy,
    pool::{BufferPool, HeapPool},
    span::search::{index_of_subslice, last_index_of_subslice},
};

pub use text::ValueStringBuilder;

enum Backing<'a, T> {
    /// Caller-supplied memory. Never released to a pool.
    View(&'a mut [T]),
    /// A store rented from the pool and owned by the buffer.
    Pooled(Vec<T>),
}

impl<T> Backing<'_, T> {
    #[inline(always)]
    fn as_slice(&self) -> &[T] {
        match self {
            Backing::View(view) => view,
            Backing::Pooled(store) => store,
        }
    }

    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Backing::View(view) => view,
            Backing::Pooled(store) => store,
        }
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.as_slice().len()
    }
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity > MAX_CAPACITY {
        return Err(BuilderError::CapacityExceeded {
            requested: capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}

/// A resizable buffer of `Copy` elements that avoids per-mutation allocation.
///
/// `T` is the element type (`u16` code units for text, see
/// [`ValueStringBuilder`]), `P` the pool new stores are rented from.
///
/// # Examples
///
/// ```rust
/// use spanbuf::GrowableBuffer;
///
/// let mut scratch = [0u8; 8];
/// let mut buf = GrowableBuffer::from_view(&mut scratch);
/// buf.extend_from_slice(b"hello")?;
/// assert!(!buf.is_pooled());
///
/// // Outgrowing the view moves the content to a pooled store.
/// buf.extend_from_slice(b", world")?;
/// assert!(buf.is_pooled());
/// assert_eq!(&buf[..], b"hello, world");
/// # Ok::<(), spanbuf::BuilderError>(())
/// ```
pub struct GrowableBuffer<'a, T: Copy, P: BufferPool<T> = HeapPool> {
    backing: Backing<'a, T>,
    len: usize,
    pool: P,
}

impl<'a, T: Copy + Default> GrowableBuffer<'a, T> {
    /// Creates an empty buffer over `view`, growing into the default pool.
    #[must_use]
    pub fn from_view(view: &'a mut [T]) -> Self {
        Self::from_view_in(view, HeapPool)
    }

    /// Creates a buffer over `view` whose first `len` elements are content.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `len > view.len()`.
    pub fn from_view_with_length(view: &'a mut [T], len: usize) -> Result<Self> {
        Self::from_view_with_length_in(view, len, HeapPool)
    }

    /// Creates an empty buffer with a rented store of at least `capacity`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if `capacity > MAX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, HeapPool)
    }

    /// Creates a buffer holding a copy of `content` with room for at least
    /// `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidArgument`] if `capacity < content.len()`.
    pub fn from_content(content: &[T], capacity: usize) -> Result<Self> {
        Self::from_content_in(content, capacity, HeapPool)
    }
}

impl<'a, T: Copy + Default, P: BufferPool<T>> GrowableBuffer<'a, T, P> {
    /// Like [`GrowableBuffer::from_view`], renting from `pool` on growth.
    #[must_use]
    pub fn from_view_in(view: &'a mut [T], pool: P) -> Self {
        Self {
            backing: Backing::View(view),
            len: 0,
            pool,
        }
    }

    /// Like [`GrowableBuffer::from_view_with_length`], renting from `pool`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `len > view.len()`.
    pub fn from_view_with_length_in(view: &'a mut [T], len: usize, pool: P) -> Result<Self> {
        if len > view.len() {
            return Err(BuilderError::out_of_range("len", len, view.len()));
        }
        Ok(Self {
            backing: Backing::View(view),
            len,
            pool,
        })
    }

    /// Like [`GrowableBuffer::with_capacity`], renting from `pool`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if `capacity > MAX_CAPACITY`.
    pub fn with_capacity_in(capacity: usize, pool: P) -> Result<Self> {
        check_capacity(capacity)?;
        let store = pool.rent(capacity);
        debug_assert!(store.len() >= capacity);
        Ok(Self {
            backing: Backing::Pooled(store),
            len: 0,
            pool,
        })
    }

    /// Like [`GrowableBuffer::from_content`], renting from `pool`.
    ///
    /// A zero capacity with empty content rents nothing.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidArgument`] if `capacity < content.len()`,
    /// [`BuilderError::CapacityExceeded`] if `capacity > MAX_CAPACITY`.
    pub fn from_content_in(content: &[T], capacity: usize, pool: P) -> Result<Self> {
        if capacity < content.len() {
            return Err(BuilderError::InvalidArgument {
                name: "capacity",
                reason: "must be at least the content length",
            });
        }
        check_capacity(capacity)?;
        if capacity == 0 {
            return Ok(Self::from_view_in(Default::default(), pool));
        }

        let mut store = pool.rent(capacity);
        debug_assert!(store.len() >= capacity);
        store[..content.len()].copy_from_slice(content);
        Ok(Self {
            backing: Backing::Pooled(store),
            len: content.len(),
            pool,
        })
    }

    // --------------------------------------------------------------------------------------------
    // Accessors
    // --------------------------------------------------------------------------------------------

    /// Number of content elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if there is no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current store can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.backing.len()
    }

    /// `true` once the buffer has moved off the caller's view (or was created
    /// with a rented store).
    #[inline]
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        matches!(self.backing, Backing::Pooled(_))
    }

    /// The pool new stores are rented from.
    #[inline]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// The content, `[0, len)`.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.backing.as_slice()[..self.len]
    }

    /// The content, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        &mut self.backing.as_mut_slice()[..len]
    }

    /// The content followed by a `T::default()` terminator.
    ///
    /// Grows by one element if needed to fit the terminator; the length is
    /// unchanged, so the next append overwrites it. The returned slice is
    /// `len() + 1` long.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn as_slice_with_terminator(&mut self) -> Result<&[T]> {
        let len = self.len;
        self.ensure_capacity(len + 1)?;
        let store = self.backing.as_mut_slice();
        store[len] = T::default();
        Ok(&store[..=len])
    }

    /// The writable scratch region `[len, capacity)`.
    ///
    /// Writing here does not change the content; call
    /// [`advance`](Self::advance) afterwards to commit what was written.
    #[inline]
    pub fn remaining_mut(&mut self) -> &mut [T] {
        let len = self.len;
        &mut self.backing.as_mut_slice()[len..]
    }

    /// Commits `count` elements written through
    /// [`remaining_mut`](Self::remaining_mut).
    ///
    /// The caller must have written all `count` elements; committing
    /// unwritten scratch exposes unspecified values as content.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `count` exceeds the scratch
    /// region.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        let spare = self.spare();
        if count > spare {
            return Err(BuilderError::out_of_range("count", count, spare));
        }
        self.len += count;
        Ok(())
    }

    /// Extends the content by `count` elements and returns them for the
    /// caller to fill.
    ///
    /// The length is advanced before the caller writes. The returned region
    /// holds unspecified values until it is overwritten, and the caller is
    /// trusted to fill every slot.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn reserve_slice(&mut self, count: usize) -> Result<&mut [T]> {
        self.reserve_additional(count)?;
        let start = self.len;
        self.len = start + count;
        Ok(&mut self.backing.as_mut_slice()[start..start + count])
    }

    /// Copies the content into `dest` if it fits.
    ///
    /// Returns `false`, leaving `dest` untouched, if `dest` is too short.
    pub fn try_copy_to(&self, dest: &mut [T]) -> bool {
        match dest.get_mut(..self.len) {
            Some(prefix) => {
                prefix.copy_from_slice(self.as_slice());
                true
            }
            None => false,
        }
    }

    /// The content as an owned `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    // --------------------------------------------------------------------------------------------
    // Capacity management
    // --------------------------------------------------------------------------------------------

    #[inline(always)]
    fn spare(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline]
    fn reserve_additional(&mut self, additional: usize) -> Result<()> {
        if additional > self.spare() {
            self.grow(additional)?;
        }
        Ok(())
    }

    /// Moves the content into a new store with room for at least
    /// `len + min_grow` elements.
    #[cold]
    #[inline(never)]
    pub(crate) fn grow(&mut self, min_grow: usize) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = growth::next_capacity(self.len, old_capacity, min_grow)?;

        let mut store = self.pool.rent(new_capacity);
        debug_assert!(store.len() >= new_capacity);
        store[..self.len].copy_from_slice(self.as_slice());

        let previous = mem::replace(&mut self.backing, Backing::Pooled(store));
        let was_pooled = matches!(previous, Backing::Pooled(_));
        if let Backing::Pooled(old) = previous {
            self.pool.release(old);
        }

        tracing::trace!(
            old_capacity,
            new_capacity = self.capacity(),
            len = self.len,
            was_pooled,
            "buffer grew"
        );
        Ok(())
    }

    /// Grows so that at least `capacity` elements fit. No-op if they already
    /// do.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if `capacity > MAX_CAPACITY`.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        check_capacity(capacity)?;
        self.grow(capacity - self.len)
    }

    /// Shrinks the store toward the content length under the default
    /// [`TrimPolicy`]. Returns whether the store was replaced.
    pub fn trim_excess(&mut self) -> bool {
        self.trim_excess_with(TrimPolicy::default())
    }

    /// Shrinks the store toward the content length under `policy`. Returns
    /// whether the store was replaced.
    pub fn trim_excess_with(&mut self, policy: TrimPolicy) -> bool {
        self.shrink_to(self.len, policy)
    }

    /// Shrinks the store toward `target` under the default [`TrimPolicy`].
    /// Returns whether the store was replaced.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `target < len()`.
    pub fn trim_excess_to(&mut self, target: usize) -> Result<bool> {
        if target < self.len {
            return Err(BuilderError::ArgumentOutOfRange {
                name: "target",
                value: target,
                min: self.len,
                max: usize::MAX,
            });
        }
        Ok(self.shrink_to(target, TrimPolicy::default()))
    }

    fn shrink_to(&mut self, target: usize, policy: TrimPolicy) -> bool {
        let capacity = self.capacity();
        if target >= capacity || !policy.should_trim(self.len, capacity, target) {
            return false;
        }
        // Caller memory costs nothing to keep; only a full release beats it.
        if target != 0 && matches!(self.backing, Backing::View(_)) {
            return false;
        }

        let replacement = if target == 0 {
            Backing::View(Default::default())
        } else {
            let mut store = self.pool.rent(target);
            if store.len() >= capacity {
                // The pool cannot hand out anything smaller.
                self.pool.release(store);
                return false;
            }
            store[..self.len].copy_from_slice(self.as_slice());
            Backing::Pooled(store)
        };

        if let Backing::Pooled(old) = mem::replace(&mut self.backing, replacement) {
            self.pool.release(old);
        }
        tracing::debug!(from = capacity, to = self.capacity(), len = self.len, "trimmed buffer");
        true
    }

    /// Releases the pooled store, if any, and consumes the buffer.
    ///
    /// Equivalent to dropping the buffer.
    pub fn dispose(self) {
        drop(self);
    }

    // --------------------------------------------------------------------------------------------
    // Appending
    // --------------------------------------------------------------------------------------------

    /// Appends one element.
    ///
    /// Writes straight into the next slot when there is room; the growth path
    /// is kept out of line.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<()> {
        let len = self.len;
        if let Some(slot) = self.backing.as_mut_slice().get_mut(len) {
            *slot = value;
            self.len = len + 1;
            Ok(())
        } else {
            self.grow_and_push(value)
        }
    }

    #[cold]
    fn grow_and_push(&mut self, value: T) -> Result<()> {
        self.grow(1)?;
        self.backing.as_mut_slice()[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Appends a copy of `values`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.reserve_additional(values.len())?;
        let start = self.len;
        let end = start + values.len();
        self.backing.as_mut_slice()[start..end].copy_from_slice(values);
        self.len = end;
        Ok(())
    }

    /// Appends `count` copies of `value`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn push_repeated(&mut self, value: T, count: usize) -> Result<()> {
        self.reserve_slice(count)?.fill(value);
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Inserting and removing
    // --------------------------------------------------------------------------------------------

    /// Shifts `[index, len)` right by `count` and returns the opened gap.
    fn open_gap(&mut self, index: usize, count: usize) -> Result<&mut [T]> {
        if index > self.len {
            return Err(BuilderError::out_of_range("index", index, self.len));
        }
        self.reserve_additional(count)?;
        let len = self.len;
        self.len = len + count;
        let store = self.backing.as_mut_slice();
        store.copy_within(index..len, index + count);
        Ok(&mut store[index..index + count])
    }

    /// Inserts a copy of `values` at `index`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `index > len()`,
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn insert_slice(&mut self, index: usize, values: &[T]) -> Result<()> {
        self.open_gap(index, values.len())?.copy_from_slice(values);
        Ok(())
    }

    /// Inserts one element at `index`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `index > len()`,
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.open_gap(index, 1)?[0] = value;
        Ok(())
    }

    /// Inserts `count` copies of `value` at `index`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `index > len()`,
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn insert_repeated(&mut self, index: usize, value: T, count: usize) -> Result<()> {
        self.open_gap(index, count)?.fill(value);
        Ok(())
    }

    /// Removes `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if the range does not lie within
    /// the content.
    pub fn remove(&mut self, start: usize, count: usize) -> Result<()> {
        let end = self.checked_range(start, count)?;
        let len = self.len;
        self.backing.as_mut_slice().copy_within(end..len, start);
        self.len = len - count;
        Ok(())
    }

    /// Shortens the content to `len` elements. No-op if it is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Empties the content. Capacity and store contents are left as they are.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn checked_range(&self, start: usize, count: usize) -> Result<usize> {
        if start > self.len {
            return Err(BuilderError::out_of_range("start", start, self.len));
        }
        let available = self.len - start;
        if count > available {
            return Err(BuilderError::out_of_range("count", count, available));
        }
        Ok(start + count)
    }

    // --------------------------------------------------------------------------------------------
    // Searching and replacing
    // --------------------------------------------------------------------------------------------

    /// Position of the first occurrence of `needle` in the content.
    #[must_use]
    pub fn index_of_slice(&self, needle: &[T]) -> Option<usize>
    where
        T: PartialEq,
    {
        index_of_subslice(self.as_slice(), needle)
    }

    /// Position of the last occurrence of `needle` in the content.
    #[must_use]
    pub fn last_index_of_slice(&self, needle: &[T]) -> Option<usize>
    where
        T: PartialEq,
    {
        last_index_of_subslice(self.as_slice(), needle)
    }

    /// `true` if `needle` occurs in the content.
    #[must_use]
    pub fn contains_slice(&self, needle: &[T]) -> bool
    where
        T: PartialEq,
    {
        self.index_of_slice(needle).is_some()
    }

    /// Replaces every element equal to `old` with `new`.
    pub fn replace_elem(&mut self, old: T, new: T)
    where
        T: PartialEq,
    {
        for slot in self.as_mut_slice() {
            if *slot == old {
                *slot = new;
            }
        }
    }

    /// Replaces every non-overlapping occurrence of `old` in the content.
    ///
    /// # Errors
    ///
    /// See [`replace`](Self::replace).
    pub fn replace_all(&mut self, old: &[T], new: &[T]) -> Result<()>
    where
        T: PartialEq,
    {
        self.replace(old, new, 0, self.len)
    }

    /// Replaces every non-overlapping occurrence of `old` that lies within
    /// `[start, start + count)` with `new`, scanning left to right.
    ///
    /// After each replacement the scan resumes right after the inserted text,
    /// so replacement text is never matched again. When `new` is longer than
    /// `old`, capacity is checked before every shift.
    ///
    /// # Errors
    ///
    /// [`BuilderError::ArgumentOutOfRange`] if `old` is empty or the range
    /// does not lie within the content, [`BuilderError::CapacityExceeded`]
    /// if growing is impossible. A growth failure leaves the replacements
    /// made so far in place.
    pub fn replace(&mut self, old: &[T], new: &[T], start: usize, count: usize) -> Result<()>
    where
        T: PartialEq,
    {
        if old.is_empty() {
            return Err(BuilderError::ArgumentOutOfRange {
                name: "old.len()",
                value: 0,
                min: 1,
                max: usize::MAX,
            });
        }
        let mut end = self.checked_range(start, count)?;
        let mut cursor = start;

        while let Some(found) = index_of_subslice(&self.as_slice()[cursor..end], old) {
            let at = cursor + found;
            let len = self.len;
            match new.len().cmp(&old.len()) {
                Ordering::Equal => {
                    self.backing.as_mut_slice()[at..at + new.len()].copy_from_slice(new);
                }
                Ordering::Less => {
                    let store = self.backing.as_mut_slice();
                    store[at..at + new.len()].copy_from_slice(new);
                    store.copy_within(at + old.len()..len, at + new.len());
                    self.len = len - (old.len() - new.len());
                }
                Ordering::Greater => {
                    let delta = new.len() - old.len();
                    self.reserve_additional(delta)?;
                    let store = self.backing.as_mut_slice();
                    store.copy_within(at + old.len()..len, at + new.len());
                    store[at..at + new.len()].copy_from_slice(new);
                    self.len = len + delta;
                }
            }
            cursor = at + new.len();
            end = end - old.len() + new.len();
        }
        Ok(())
    }

    /// Asserts the structural invariants. Used by the fuzz targets.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn check_invariants(&self) {
        assert!(self.len <= self.capacity(), "len {} > capacity {}", self.len, self.capacity());
        assert_eq!(self.as_slice().len(), self.len);
    }
}

impl<T: Copy, P: BufferPool<T>> Drop for GrowableBuffer<'_, T, P> {
    fn drop(&mut self) {
        self.len = 0;
        if let Backing::Pooled(store) = mem::replace(&mut self.backing, Backing::View(Default::default())) {
            self.pool.release(store);
        }
    }
}

impl<T: Copy + Default, P: BufferPool<T>> Deref for GrowableBuffer<'_, T, P> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default, P: BufferPool<T>> DerefMut for GrowableBuffer<'_, T, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy + Default, P: BufferPool<T>> AsRef<[T]> for GrowableBuffer<'_, T, P> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default + fmt::Debug, P: BufferPool<T>> fmt::Debug for GrowableBuffer<'_, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("pooled", &self.is_pooled())
            .field("content", &self.as_slice())
            .finish()
    }
}
