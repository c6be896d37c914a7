#![allow(missing_docs)]

mod common;

use common::CountingPool;
use rstest::rstest;
use spanbuf::{GrowableBuffer, SlabPool, ValueStringBuilder};

/// Appends one unit at a time until `growths` reallocations have happened.
fn grow_times<P: spanbuf::BufferPool<u16>>(sb: &mut ValueStringBuilder<'_, P>, growths: usize) {
    let mut seen = 0;
    while seen < growths {
        let before = sb.capacity();
        sb.push(u16::from(b'x')).unwrap();
        if sb.capacity() != before {
            seen += 1;
        }
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn pool_constructed_releases_every_store(#[case] growths: usize) {
    let pool = CountingPool::default();
    let mut sb = ValueStringBuilder::with_capacity_in(4, &pool).unwrap();
    grow_times(&mut sb, growths);
    sb.dispose();
    assert_eq!(pool.rents(), growths + 1);
    assert_eq!(pool.releases(), growths + 1);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn view_constructed_never_releases_the_view(#[case] growths: usize) {
    let pool = CountingPool::default();
    let mut view = [0u16; 4];
    let mut sb = ValueStringBuilder::from_view_in(&mut view, &pool);
    grow_times(&mut sb, growths);
    sb.dispose();
    assert_eq!(pool.rents(), growths);
    assert_eq!(pool.releases(), growths);
}

#[test]
fn nothing_is_outstanding_while_growing() {
    let pool = CountingPool::default();
    let mut sb = ValueStringBuilder::with_capacity_in(1, &pool).unwrap();
    for i in 0..1000u16 {
        sb.push(i).unwrap();
        // Only the current store is ever held.
        assert_eq!(pool.outstanding(), 1);
    }
    drop(sb);
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn clear_then_append_within_capacity_does_not_rent() {
    let pool = CountingPool::default();
    let mut sb = ValueStringBuilder::with_capacity_in(64, &pool).unwrap();
    sb.append_str("first pass").unwrap();
    let capacity = sb.capacity();
    for _ in 0..100 {
        sb.clear();
        sb.append_str("another pass of similar length").unwrap();
    }
    assert_eq!(sb.capacity(), capacity);
    assert_eq!(pool.rents(), 1);
}

#[rstest]
#[case::cjk("日本")]
#[case::euro("€€€€")]
#[case::surrogate_pair("ab𝄞")]
fn clear_then_non_ascii_append_does_not_rent(#[case] text: &str) {
    let pool = CountingPool::default();
    let mut sb = ValueStringBuilder::with_capacity_in(4, &pool).unwrap();
    sb.append_str("abcd").unwrap();
    sb.clear();
    // More UTF-8 bytes than capacity, but no more code units.
    sb.append_str(text).unwrap();
    assert_eq!(sb, text);
    assert_eq!(sb.capacity(), 4);
    assert_eq!(pool.rents(), 1);
}

#[test]
fn oversized_construction_rents_nothing() {
    let pool = CountingPool::default();
    assert!(ValueStringBuilder::with_capacity_in(usize::MAX, &pool).is_err());
    assert!(GrowableBuffer::<u8, _>::from_content_in(b"abc", usize::MAX, &pool).is_err());
    assert_eq!(pool.rents(), 0);
}

#[test]
fn failed_growth_rents_nothing() {
    let pool = CountingPool::default();
    let mut buf = GrowableBuffer::<u8, _>::with_capacity_in(4, &pool).unwrap();
    assert!(buf.ensure_capacity(usize::MAX).is_err());
    assert!(buf.reserve_slice(usize::MAX).is_err());
    assert_eq!(pool.rents(), 1);
    assert_eq!(buf.capacity(), 4);
}

#[test]
fn slab_pool_recycles_across_builders() {
    let pool = SlabPool::<u16>::new();
    for _ in 0..10 {
        let mut scratch = [0u16; 8];
        let mut sb = ValueStringBuilder::from_view_in(&mut scratch, pool.clone());
        sb.append_str("a line long enough to leave the stack scratch behind").unwrap();
        assert!(sb.is_pooled());
    }

    let stats = pool.statistics();
    assert_eq!(stats.rents, 10);
    assert_eq!(stats.releases, 10);
    assert_eq!(stats.reused, 9);
    assert_eq!(stats.available_stores, 1);
}

#[test]
fn slab_pool_is_shared_between_threads() {
    let pool = SlabPool::<u16>::new();
    std::thread::scope(|scope| {
        for t in 0..4u16 {
            let pool = pool.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    let mut sb = ValueStringBuilder::with_capacity_in(16, pool.clone()).unwrap();
                    spanbuf::span::fill_sequential(sb.reserve_slice(40).unwrap(), t);
                    assert_eq!(sb.len(), 40);
                }
            });
        }
    });
    let stats = pool.statistics();
    assert_eq!(stats.rents, stats.releases);
    assert!(stats.reused > 0);
}
