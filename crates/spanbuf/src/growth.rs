//! Capacity growth policy for [`GrowableBuffer`](crate::GrowableBuffer).
//!
//! Capacity doubles on every growth, which keeps appends amortized O(1), but
//! never by less than the caller needs and never past [`MAX_CAPACITY`].

use crate::error::BuilderError;

/// The largest number of elements a backing store may hold.
///
/// Matches the largest array length most managed runtimes allow, which keeps
/// buffers interchangeable with such hosts across FFI boundaries.
pub const MAX_CAPACITY: usize = 0x7FFF_FFC7;

/// Computes the capacity of the next backing store.
///
/// `min_grow` is the number of elements the caller needs beyond `len`; it
/// must be at least one.
///
/// # Errors
///
/// Returns [`BuilderError::CapacityExceeded`] when `len + min_grow` overflows
/// or exceeds [`MAX_CAPACITY`].
pub fn next_capacity(len: usize, capacity: usize, min_grow: usize) -> Result<usize, BuilderError> {
    debug_assert!(min_grow >= 1, "growth must request at least one element");
    debug_assert!(len <= capacity);

    let required = len.checked_add(min_grow).ok_or(BuilderError::CapacityExceeded {
        requested: usize::MAX,
        max: MAX_CAPACITY,
    })?;
    if required > MAX_CAPACITY {
        return Err(BuilderError::CapacityExceeded {
            requested: required,
            max: MAX_CAPACITY,
        });
    }

    let doubled = capacity.saturating_mul(2).min(MAX_CAPACITY);
    Ok(doubled.max(required))
}
