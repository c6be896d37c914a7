//! Arithmetic-progression fills.

use super::aggregate::Numeric;

/// Fills `dest` with `start, start + 1, start + 2, ...`.
///
/// Integer progressions wrap around on overflow.
#[inline]
pub fn fill_sequential<T: Numeric>(dest: &mut [T], start: T) {
    fill_sequential_by(dest, start, T::ONE);
}

/// Fills `dest` with `start, start + step, start + 2 * step, ...`.
///
/// Integer progressions wrap around on overflow. Float progressions are built
/// by repeated addition, so rounding error accumulates along the slice.
pub fn fill_sequential_by<T: Numeric>(dest: &mut [T], start: T, step: T) {
    let mut next = start;
    for slot in dest {
        *slot = next;
        next = next.wrapping_add(step);
    }
}
