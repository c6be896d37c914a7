//! Sums, extrema and averages over numeric slices.
//!
//! Floating-point extrema use a total order in which NaN sorts below every
//! other value, `-inf` included: [`min`] returns NaN as soon as one is
//! present and [`max`] only returns NaN when every element is NaN. The
//! comparer-based [`min_by`] / [`max_by`] apply the caller's ordering as-is.

use core::cmp::Ordering;

use crate::error::SpanError;

/// Number of independent accumulators used by [`wrapping_sum`].
const LANES: usize = 8;

/// Primitive numbers the aggregate functions operate on.
pub trait Numeric: Copy + PartialOrd {
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity; the default step of
    /// [`fill_sequential`](super::fill::fill_sequential).
    const ONE: Self;

    /// Addition that reports integer overflow as `None`. Floats never fail.
    fn checked_add(self, rhs: Self) -> Option<Self>;
    /// Addition with two's-complement wraparound for integers.
    fn wrapping_add(self, rhs: Self) -> Self;
    /// `true` only for floating-point NaN.
    fn is_nan(self) -> bool;
    /// Lossy conversion used by [`average`].
    fn to_f64(self) -> f64;
}

/// Numbers with a wider accumulator type for [`long_sum`] and [`average`].
pub trait Widening: Numeric {
    /// The accumulator type.
    type Wide: Numeric;
    /// Converts a value into the accumulator type.
    fn widen(self) -> Self::Wide;
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {$(
        impl Numeric for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$t>::checked_add(self, rhs)
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline]
            fn is_nan(self) -> bool {
                false
            }

            #[inline]
            #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($t:ty),* $(,)?) => {$(
        impl Numeric for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn checked_add(self, rhs: Self) -> Option<Self> {
                Some(self + rhs)
            }

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self {
                self + rhs
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }

            #[inline]
            #[allow(clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

macro_rules! impl_widening {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl Widening for $t {
            type Wide = $wide;

            #[inline]
            #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
            fn widen(self) -> $wide {
                self as $wide
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float!(f32, f64);
impl_widening!(
    i8 => i64, i16 => i64, i32 => i64, i64 => i128, i128 => i128, isize => i128,
    u8 => u64, u16 => u64, u32 => u64, u64 => u128, u128 => u128, usize => u128,
    f32 => f64, f64 => f64,
);

/// Sum of all elements, failing on integer overflow.
///
/// Overflow is detected on every intermediate sum, in element order.
///
/// # Errors
///
/// [`SpanError::Overflow`] if any partial sum overflows.
pub fn sum<T: Numeric>(values: &[T]) -> Result<T, SpanError> {
    values
        .iter()
        .try_fold(T::ZERO, |acc, &value| acc.checked_add(value))
        .ok_or(SpanError::Overflow)
}

/// Sum of all elements with integer wraparound.
///
/// Accumulates into independent lanes so the loop vectorises; integer
/// wraparound is associative, so the result equals a sequential wrapping sum.
/// Float results may differ from a sequential sum in the last bits.
pub fn wrapping_sum<T: Numeric>(values: &[T]) -> T {
    let mut lanes = [T::ZERO; LANES];
    let mut chunks = values.chunks_exact(LANES);
    for chunk in &mut chunks {
        for (lane, &value) in lanes.iter_mut().zip(chunk) {
            *lane = lane.wrapping_add(value);
        }
    }

    let tail = chunks
        .remainder()
        .iter()
        .fold(T::ZERO, |acc, &value| acc.wrapping_add(value));
    lanes.into_iter().fold(tail, Numeric::wrapping_add)
}

/// Sum of all elements accumulated in the wider type.
///
/// # Errors
///
/// [`SpanError::Overflow`] if the widened sum overflows.
pub fn long_sum<T: Widening>(values: &[T]) -> Result<T::Wide, SpanError> {
    values
        .iter()
        .try_fold(<T::Wide as Numeric>::ZERO, |acc, &value| {
            acc.checked_add(value.widen())
        })
        .ok_or(SpanError::Overflow)
}

/// Arithmetic mean, computed from the widened sum.
///
/// # Errors
///
/// [`SpanError::Empty`] for an empty slice, [`SpanError::Overflow`] if the
/// widened sum overflows.
#[allow(clippy::cast_precision_loss)]
pub fn average<T: Widening>(values: &[T]) -> Result<f64, SpanError> {
    if values.is_empty() {
        return Err(SpanError::Empty);
    }
    Ok(long_sum(values)?.to_f64() / values.len() as f64)
}

/// NaN-aware "less than": NaN is below everything except another NaN.
#[inline]
fn total_lt<T: Numeric>(a: T, b: T) -> bool {
    match (a.is_nan(), b.is_nan()) {
        (true, nan) => !nan,
        (false, true) => false,
        (false, false) => a < b,
    }
}

/// Smallest element; NaN if any element is NaN.
///
/// # Errors
///
/// [`SpanError::Empty`] for an empty slice.
pub fn min<T: Numeric>(values: &[T]) -> Result<T, SpanError> {
    let (&first, rest) = values.split_first().ok_or(SpanError::Empty)?;
    let mut best = first;
    for &value in rest {
        if best.is_nan() {
            break;
        }
        if total_lt(value, best) {
            best = value;
        }
    }
    Ok(best)
}

/// Largest element; NaN only if every element is NaN.
///
/// # Errors
///
/// [`SpanError::Empty`] for an empty slice.
pub fn max<T: Numeric>(values: &[T]) -> Result<T, SpanError> {
    let (&first, rest) = values.split_first().ok_or(SpanError::Empty)?;
    Ok(rest
        .iter()
        .fold(first, |best, &value| if total_lt(best, value) { value } else { best }))
}

/// Smallest element under `compare`; the first of several equal minima wins.
///
/// # Errors
///
/// [`SpanError::Empty`] for an empty slice.
pub fn min_by<T, F>(values: &[T], mut compare: F) -> Result<T, SpanError>
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let (&first, rest) = values.split_first().ok_or(SpanError::Empty)?;
    Ok(rest.iter().fold(first, |best, value| {
        if compare(value, &best) == Ordering::Less {
            *value
        } else {
            best
        }
    }))
}

/// Largest element under `compare`; the first of several equal maxima wins.
///
/// # Errors
///
/// [`SpanError::Empty`] for an empty slice.
pub fn max_by<T, F>(values: &[T], mut compare: F) -> Result<T, SpanError>
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let (&first, rest) = values.split_first().ok_or(SpanError::Empty)?;
    Ok(rest.iter().fold(first, |best, value| {
        if compare(value, &best) == Ordering::Greater {
            *value
        } else {
            best
        }
    }))
}
