use alloc::{format, vec, vec::Vec};
use core::cell::Cell;

use rstest::rstest;

use super::*;
use crate::ValueStringBuilder;

/// Heap pool that counts rents and releases.
#[derive(Default)]
struct Counting {
    rents: Cell<usize>,
    releases: Cell<usize>,
}

impl<T: Copy + Default> BufferPool<T> for Counting {
    fn rent(&self, min_len: usize) -> Vec<T> {
        self.rents.set(self.rents.get() + 1);
        vec![T::default(); min_len]
    }

    fn release(&self, store: Vec<T>) {
        self.releases.set(self.releases.get() + 1);
        drop(store);
    }
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn view_backed_until_growth() {
    let mut view = [0u8; 4];
    let pool = Counting::default();
    let mut buf = GrowableBuffer::from_view_in(&mut view, &pool);
    buf.extend_from_slice(b"abcd").unwrap();
    assert_eq!(buf.capacity(), 4);
    assert!(!buf.is_pooled());
    assert_eq!(pool.rents.get(), 0);

    buf.push(b'e').unwrap();
    assert_eq!(buf.capacity(), 8);
    assert!(buf.is_pooled());
    assert_eq!(&buf[..], b"abcde");
    // The view was never the pool's, so nothing was released.
    assert_eq!((pool.rents.get(), pool.releases.get()), (1, 0));

    buf.extend_from_slice(b"fghij").unwrap();
    assert_eq!(buf.capacity(), 16);
    assert_eq!((pool.rents.get(), pool.releases.get()), (2, 1));

    drop(buf);
    assert_eq!(pool.releases.get(), 2);
}

#[test]
fn construction_checks() {
    let mut view = [1u16, 2, 3];
    assert_eq!(
        GrowableBuffer::from_view_with_length(&mut view, 4).unwrap_err(),
        BuilderError::ArgumentOutOfRange {
            name: "len",
            value: 4,
            min: 0,
            max: 3
        }
    );
    let buf = GrowableBuffer::from_view_with_length(&mut view, 2).unwrap();
    assert_eq!(&buf[..], &[1, 2]);
    drop(buf);

    assert!(matches!(
        GrowableBuffer::from_content(&[1u8, 2, 3], 2),
        Err(BuilderError::InvalidArgument { name: "capacity", .. })
    ));

    let pool = Counting::default();
    let empty = GrowableBuffer::<u8, _>::from_content_in(&[], 0, &pool).unwrap();
    assert_eq!(empty.capacity(), 0);
    assert_eq!(pool.rents.get(), 0);

    let copied = GrowableBuffer::from_content(b"xy", 10).unwrap();
    assert_eq!(copied.capacity(), 10);
    assert_eq!(&copied[..], b"xy");
}

#[test]
fn oversized_capacity_is_an_error() {
    let exceeded = BuilderError::CapacityExceeded {
        requested: usize::MAX,
        max: MAX_CAPACITY,
    };
    assert_eq!(GrowableBuffer::<u8>::with_capacity(usize::MAX).unwrap_err(), exceeded);
    assert_eq!(GrowableBuffer::from_content(b"abc", usize::MAX).unwrap_err(), exceeded);

    let pool = Counting::default();
    assert!(GrowableBuffer::<u16, _>::with_capacity_in(MAX_CAPACITY + 1, &pool).is_err());
    assert_eq!(pool.rents.get(), 0);
}

#[test]
fn push_matches_single_element_extend() {
    let mut a = GrowableBuffer::<u32>::from_view(&mut []);
    let mut b = GrowableBuffer::<u32>::from_view(&mut []);
    for i in 0..100 {
        a.push(i).unwrap();
        b.extend_from_slice(&[i]).unwrap();
    }
    assert_eq!(a.as_slice(), b.as_slice());
    assert_eq!(a.capacity(), b.capacity());
}

#[test]
fn insert_and_remove() {
    let mut view = [0u8; 6];
    let mut buf = GrowableBuffer::from_view(&mut view);
    buf.extend_from_slice(b"ace").unwrap();
    buf.insert(1, b'b').unwrap();
    buf.insert_slice(3, b"d").unwrap();
    buf.insert_repeated(5, b'!', 3).unwrap();
    assert_eq!(&buf[..], b"abcde!!!");
    buf.remove(5, 3).unwrap();
    buf.remove(0, 1).unwrap();
    assert_eq!(&buf[..], b"bcde");
    buf.insert_slice(4, b"f").unwrap();
    assert_eq!(&buf[..], b"bcdef");
}

#[test]
fn failed_checks_leave_content_unchanged() {
    let mut buf = GrowableBuffer::from_content(b"hello", 8).unwrap();
    let capacity = buf.capacity();

    assert!(buf.insert_slice(6, b"x").is_err());
    assert!(buf.remove(3, 3).is_err());
    assert!(buf.remove(6, 0).is_err());
    assert!(buf.remove(usize::MAX, usize::MAX).is_err());
    assert!(buf.replace(b"", b"x", 0, 5).is_err());
    assert!(buf.replace(b"l", b"L", 2, 4).is_err());
    assert!(buf.advance(4).is_err());
    assert!(matches!(
        buf.ensure_capacity(MAX_CAPACITY + 1),
        Err(BuilderError::CapacityExceeded { .. })
    ));

    assert_eq!(&buf[..], b"hello");
    assert_eq!(buf.capacity(), capacity);
}

#[rstest]
#[case::shrink("aXbXcX", "X", "", "abc")]
#[case::same("aXbXcX", "X", "Y", "aYbYcY")]
#[case::grow("aXbXcX", "X", "YYY", "aYYYbYYYcYYY")]
#[case::replacement_contains_old("aXbX", "X", "XX", "aXXbXX")]
#[case::overlapping_candidates("aaaa", "aa", "b", "bb")]
#[case::no_match("abc", "z", "y", "abc")]
#[case::whole("abc", "abc", "", "")]
fn replace_all_cases(#[case] content: &str, #[case] old: &str, #[case] new: &str, #[case] expected: &str) {
    // A tiny view forces the growing cases through several reallocations.
    let mut view = [0u16; 2];
    let mut sb = ValueStringBuilder::from_view(&mut view);
    sb.append_str(content).unwrap();
    sb.replace_all(&units(old), &units(new)).unwrap();
    assert_eq!(sb, expected);
}

#[test]
fn replace_within_range() {
    let mut sb = ValueStringBuilder::with_capacity(16).unwrap();
    sb.append_str("XaXbXcX").unwrap();
    sb.replace(&units("X"), &units("__"), 1, 4).unwrap();
    assert_eq!(sb, "Xa__b__cX");
}

#[test]
fn replace_elem_and_search() {
    let mut buf = GrowableBuffer::from_content(b"banana", 6).unwrap();
    assert_eq!(buf.index_of_slice(b"an"), Some(1));
    assert_eq!(buf.last_index_of_slice(b"an"), Some(3));
    assert!(buf.contains_slice(b"nan"));
    assert!(!buf.contains_slice(b"x"));
    buf.replace_elem(b'a', b'o');
    assert_eq!(&buf[..], b"bonono");
}

#[test]
fn clear_keeps_the_store() {
    let pool = Counting::default();
    let mut buf = GrowableBuffer::<u8, _>::with_capacity_in(4, &pool).unwrap();
    buf.extend_from_slice(b"abcd").unwrap();
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), 4);
    buf.extend_from_slice(b"wxyz").unwrap();
    assert_eq!(&buf[..], b"wxyz");
    assert_eq!(pool.rents.get(), 1);
}

#[test]
fn non_ascii_text_that_fits_stays_on_the_view() {
    let pool = Counting::default();
    let mut view = [0u16; 3];
    let mut sb = GrowableBuffer::from_view_in(&mut view, &pool);
    sb.append_str("€€€").unwrap();
    assert_eq!(sb, "€€€");
    assert!(!sb.is_pooled());
    assert_eq!(pool.rents.get(), 0);

    sb.append_str("€").unwrap();
    assert!(sb.is_pooled());
    assert_eq!(sb, "€€€€");
}

#[test]
fn terminator_is_outside_the_content() {
    let mut view = [7u16; 3];
    let mut sb = ValueStringBuilder::from_view(&mut view);
    sb.append_str("abc").unwrap();
    assert_eq!(sb.as_slice_with_terminator().unwrap(), &units("abc\0")[..]);
    assert_eq!(sb.len(), 3);
    assert!(sb.is_pooled());

    // The next append overwrites the terminator.
    sb.append_char('d').unwrap();
    assert_eq!(sb, "abcd");
}

#[test]
fn direct_writes() {
    let mut buf = GrowableBuffer::<u8>::with_capacity(4).unwrap();
    let spare = buf.remaining_mut();
    assert_eq!(spare.len(), 4);
    spare[..2].copy_from_slice(b"hi");
    buf.advance(2).unwrap();
    assert_eq!(&buf[..], b"hi");

    buf.reserve_slice(5).unwrap().copy_from_slice(b"there");
    assert_eq!(&buf[..], b"hithere");
    assert!(buf.capacity() >= 7);

    buf.as_mut_slice()[0] = b'H';
    buf[1] = b'I';
    assert_eq!(buf.to_vec(), b"HIthere".to_vec());
}

#[test]
fn try_copy_to_requires_room() {
    let buf = GrowableBuffer::from_content(b"abc", 3).unwrap();
    let mut small = [0u8; 2];
    assert!(!buf.try_copy_to(&mut small));
    assert_eq!(small, [0, 0]);
    let mut exact = [0u8; 3];
    assert!(buf.try_copy_to(&mut exact));
    assert_eq!(&exact, b"abc");
}

#[test]
fn ensure_capacity_grows_only_when_needed() {
    let pool = Counting::default();
    let mut view = [0u8; 8];
    let mut buf = GrowableBuffer::from_view_in(&mut view, &pool);
    buf.ensure_capacity(8).unwrap();
    assert_eq!(pool.rents.get(), 0);
    buf.ensure_capacity(9).unwrap();
    assert_eq!(buf.capacity(), 16);
    buf.ensure_capacity(100).unwrap();
    assert_eq!(buf.capacity(), 100);
    assert_eq!(pool.rents.get(), 2);
}

#[test]
fn trimming() {
    let pool = Counting::default();
    let mut buf = GrowableBuffer::<u8, _>::with_capacity_in(1024, &pool).unwrap();
    buf.extend_from_slice(&[1; 1000]).unwrap();
    // Well utilised: left alone.
    assert!(!buf.trim_excess());

    buf.truncate(10);
    assert!(buf.trim_excess());
    assert_eq!(buf.capacity(), 10);
    assert_eq!(&buf[..], &[1; 10]);
    assert_eq!((pool.rents.get(), pool.releases.get()), (2, 1));

    // Too little waste for the default policy.
    assert!(!buf.trim_excess());

    assert!(buf.trim_excess_to(5).is_err());
    buf.clear();
    assert!(buf.trim_excess_with(TrimPolicy {
        min_waste: 0,
        utilization_percent: 100,
    }));
    assert_eq!(buf.capacity(), 0);
    assert!(!buf.is_pooled());
    assert_eq!(pool.releases.get(), 2);
}

#[test]
fn view_backed_trim_only_releases_to_empty() {
    let eager = TrimPolicy {
        min_waste: 0,
        utilization_percent: 100,
    };
    let pool = Counting::default();
    let mut view = [0u8; 64];
    let mut buf = GrowableBuffer::from_view_in(&mut view, &pool);
    buf.extend_from_slice(b"ab").unwrap();

    assert!(!buf.trim_excess_with(eager));
    assert!(!buf.trim_excess_to(8).unwrap());
    assert_eq!(buf.capacity(), 64);
    assert!(!buf.is_pooled());
    assert_eq!(pool.rents.get(), 0);

    buf.clear();
    assert!(buf.trim_excess_with(eager));
    assert_eq!(buf.capacity(), 0);
    assert_eq!((pool.rents.get(), pool.releases.get()), (0, 0));
}

#[test]
fn trim_to_target_keeps_headroom() {
    let mut buf = GrowableBuffer::<u8>::with_capacity(4096).unwrap();
    buf.extend_from_slice(b"abc").unwrap();
    assert!(buf.trim_excess_to(512).unwrap());
    assert_eq!(buf.capacity(), 512);
    assert_eq!(&buf[..], b"abc");
}

#[test]
fn dispose_releases_once() {
    let pool = Counting::default();
    let buf = GrowableBuffer::<u16, _>::with_capacity_in(8, &pool).unwrap();
    buf.dispose();
    assert_eq!(pool.releases.get(), 1);

    let mut view = [0u16; 4];
    let buf = GrowableBuffer::from_view_in(&mut view, &pool);
    buf.dispose();
    assert_eq!(pool.releases.get(), 1);
}

#[test]
fn debug_shows_only_content() {
    let mut view = [9u8; 4];
    let mut buf = GrowableBuffer::from_view(&mut view);
    buf.push(1).unwrap();
    insta::assert_snapshot!(
        format!("{buf:?}"),
        @"GrowableBuffer { len: 1, capacity: 4, pooled: false, content: [1] }"
    );
}
