//! Unchecked reinterpretation of slice memory.
//!
//! These functions exist for interop and hot loops that need to view, for
//! example, a `[u32]` as bytes or a `[u8]` as `u16` code units. Nothing about
//! the element types is verified in release builds; the caller carries the
//! whole burden of proof.

use core::mem::{align_of, size_of, size_of_val};

/// Reinterprets the memory of `source` as a slice of `U`.
///
/// The returned slice covers the same bytes: its length is
/// `source.len() * size_of::<T>() / size_of::<U>()`.
///
/// # Safety
///
/// The caller must guarantee that:
/// - `size_of::<U>()` is non-zero and the byte length of `source` is a
///   multiple of it;
/// - `source` is aligned for `U`;
/// - every bit pattern found in `source` is a valid `U` (no padding bytes of
///   `T` are read as `U` data, no invalid `bool`/`char`/enum values).
///
/// Debug builds assert the size and alignment conditions.
#[must_use]
pub unsafe fn cast_slice<T, U>(source: &[T]) -> &[U] {
    let bytes = size_of_val(source);
    debug_assert!(size_of::<U>() != 0, "cannot cast to a zero-sized type");
    debug_assert!(bytes % size_of::<U>() == 0, "byte length is not a multiple of the target size");
    debug_assert!(source.as_ptr().cast::<U>().is_aligned(), "source is misaligned for the target type");
    // SAFETY: the caller guarantees size, alignment and validity of the
    // reinterpreted elements; the lifetime and mutability are carried over.
    unsafe { core::slice::from_raw_parts(source.as_ptr().cast::<U>(), bytes / size_of::<U>()) }
}

/// Mutable counterpart of [`cast_slice`].
///
/// # Safety
///
/// Same requirements as [`cast_slice`], and additionally every `U` written
/// through the result must leave the memory a valid sequence of `T`.
#[must_use]
pub unsafe fn cast_slice_mut<T, U>(source: &mut [T]) -> &mut [U] {
    let bytes = size_of_val(source);
    debug_assert!(size_of::<U>() != 0, "cannot cast to a zero-sized type");
    debug_assert!(bytes % size_of::<U>() == 0, "byte length is not a multiple of the target size");
    debug_assert!(source.as_ptr().cast::<U>().is_aligned(), "source is misaligned for the target type");
    // SAFETY: see `cast_slice`; exclusivity is inherited from `source`.
    unsafe {
        core::slice::from_raw_parts_mut(source.as_mut_ptr().cast::<U>(), bytes / size_of::<U>())
    }
}

/// Alignment of `U` is a multiple of that of `T` and sizes divide evenly, so
/// any `[T]` can be reinterpreted as `[U]` as far as layout is concerned.
#[must_use]
pub const fn layout_compatible<T, U>() -> bool {
    size_of::<U>() != 0 && size_of::<T>() % size_of::<U>() == 0 && align_of::<T>() % align_of::<U>() == 0
}
