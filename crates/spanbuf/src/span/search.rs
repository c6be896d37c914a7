//! Linear searches over slices, with optional custom equality.

/// Returns `true` if `haystack` contains `value`.
#[inline]
pub fn contains<T: PartialEq>(haystack: &[T], value: &T) -> bool {
    index_of(haystack, value).is_some()
}

/// Returns `true` if any element of `haystack` is equal to `value` under `eq`.
#[inline]
pub fn contains_by<T, F>(haystack: &[T], value: &T, eq: F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    index_of_by(haystack, value, eq).is_some()
}

/// Position of the first element equal to `value`.
#[inline]
pub fn index_of<T: PartialEq>(haystack: &[T], value: &T) -> Option<usize> {
    haystack.iter().position(|item| item == value)
}

/// Position of the first element equal to `value` under `eq`.
pub fn index_of_by<T, F>(haystack: &[T], value: &T, mut eq: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> bool,
{
    haystack.iter().position(|item| eq(item, value))
}

/// Position of the last element equal to `value`.
#[inline]
pub fn last_index_of<T: PartialEq>(haystack: &[T], value: &T) -> Option<usize> {
    haystack.iter().rposition(|item| item == value)
}

/// Start of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at position zero.
pub fn index_of_subslice<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    let Some((first, rest)) = needle.split_first() else {
        return Some(0);
    };
    if needle.len() > haystack.len() {
        return None;
    }

    let last_start = haystack.len() - needle.len();
    let mut offset = 0;
    while offset <= last_start {
        // Scan for the first element, then verify the remainder.
        let found = haystack[offset..=last_start].iter().position(|item| item == first)?;
        let start = offset + found;
        if haystack[start + 1..start + needle.len()] == *rest {
            return Some(start);
        }
        offset = start + 1;
    }
    None
}

/// Start of the last occurrence of `needle` in `haystack`.
///
/// An empty needle matches at `haystack.len()`.
pub fn last_index_of_subslice<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    haystack.windows(needle.len()).rposition(|window| window == needle)
}
