/// When [`GrowableBuffer::trim_excess`](crate::GrowableBuffer::trim_excess)
/// is allowed to shrink the backing store.
///
/// Shrinking costs a rent and a copy, so a buffer that is only slightly
/// oversized is left alone. Both conditions must hold for a trim to happen:
/// the store must be under-utilised, and the shrink must free a meaningful
/// number of elements.
///
/// # Examples
///
/// ```rust
/// use spanbuf::{GrowableBuffer, TrimPolicy};
///
/// let mut buf = GrowableBuffer::<u8>::with_capacity(1024).unwrap();
/// buf.extend_from_slice(b"tiny").unwrap();
///
/// let eager = TrimPolicy { min_waste: 0, utilization_percent: 100 };
/// assert!(buf.trim_excess_with(eager));
/// assert_eq!(buf.capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrimPolicy {
    /// Minimum number of elements a trim must free.
    ///
    /// # Default
    ///
    /// `256`
    pub min_waste: usize,

    /// Utilisation (in percent of capacity) below which the store counts as
    /// oversized. A buffer whose live length is at or above this share of its
    /// capacity is never trimmed.
    ///
    /// # Default
    ///
    /// `90`
    pub utilization_percent: u8,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            min_waste: 256,
            utilization_percent: 90,
        }
    }
}

impl TrimPolicy {
    pub(crate) fn should_trim(self, len: usize, capacity: usize, target: usize) -> bool {
        let waste = capacity.saturating_sub(target);
        waste > 0
            && waste >= self.min_waste
            && (len as u128) * 100 < (capacity as u128) * u128::from(self.utilization_percent)
    }
}

/// Bounds applied while scanning composite format templates.
///
/// Templates come from configuration files or user input often enough that an
/// index like `{999999999999}` must not turn into a pathological argument
/// lookup or a multi-gigabyte padding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatLimits {
    /// Exclusive upper bound for argument indices.
    ///
    /// # Default
    ///
    /// `1_000_000`
    pub max_index: usize,

    /// Exclusive upper bound for the magnitude of an alignment.
    ///
    /// # Default
    ///
    /// `1_000_000`
    pub max_alignment: usize,
}

impl Default for FormatLimits {
    fn default() -> Self {
        Self {
            max_index: 1_000_000,
            max_alignment: 1_000_000,
        }
    }
}
