#![no_main]
//! Drives a `GrowableBuffer<u16>` and a `Vec<u16>` model with the same
//! operations and checks they never disagree.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spanbuf::{GrowableBuffer, SlabPool, TrimPolicy};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u16),
    Extend(Vec<u16>),
    Repeat(u16, u8),
    Insert(u16, Vec<u16>),
    Remove(u16, u16),
    Replace { old: Vec<u8>, new: Vec<u8> },
    Truncate(u16),
    Clear,
    Ensure(u16),
    Trim { min_waste: u8, utilization_percent: u8 },
    Reserve(u8),
    Terminate,
}

#[derive(Debug, Arbitrary)]
struct Input {
    view_len: u8,
    ops: Vec<Op>,
}

/// Small alphabet so replacements find matches.
fn letters(raw: &[u8]) -> Vec<u16> {
    raw.iter().take(4).map(|b| u16::from(b % 3)).collect()
}

fn naive_replace(haystack: &[u16], old: &[u16], new: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(old) {
            out.extend_from_slice(new);
            i += old.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn run(input: Input) {
    let pool = SlabPool::<u16>::with_max_retained(4);
    let mut view = vec![0u16; usize::from(input.view_len)];
    let mut buf = GrowableBuffer::from_view_in(&mut view, pool.clone());
    let mut model: Vec<u16> = Vec::new();

    for op in input.ops {
        match op {
            Op::Push(v) => {
                buf.push(v).unwrap();
                model.push(v);
            }
            Op::Extend(values) => {
                buf.extend_from_slice(&values).unwrap();
                model.extend_from_slice(&values);
            }
            Op::Repeat(v, n) => {
                buf.push_repeated(v, usize::from(n)).unwrap();
                model.extend(std::iter::repeat_n(v, usize::from(n)));
            }
            Op::Insert(at, values) => {
                let at = usize::from(at);
                if at > model.len() {
                    assert!(buf.insert_slice(at, &values).is_err());
                } else {
                    buf.insert_slice(at, &values).unwrap();
                    model.splice(at..at, values);
                }
            }
            Op::Remove(start, count) => {
                let (start, count) = (usize::from(start), usize::from(count));
                if start + count > model.len() {
                    assert!(buf.remove(start, count).is_err());
                } else {
                    buf.remove(start, count).unwrap();
                    model.drain(start..start + count);
                }
            }
            Op::Replace { old, new } => {
                let old = letters(&old);
                let new = letters(&new);
                if old.is_empty() {
                    assert!(buf.replace_all(&old, &new).is_err());
                } else {
                    buf.replace_all(&old, &new).unwrap();
                    model = naive_replace(&model, &old, &new);
                }
            }
            Op::Truncate(len) => {
                buf.truncate(usize::from(len));
                model.truncate(usize::from(len));
            }
            Op::Clear => {
                buf.clear();
                model.clear();
            }
            Op::Ensure(capacity) => {
                buf.ensure_capacity(usize::from(capacity)).unwrap();
                assert!(buf.capacity() >= usize::from(capacity));
            }
            Op::Trim {
                min_waste,
                utilization_percent,
            } => {
                buf.trim_excess_with(TrimPolicy {
                    min_waste: usize::from(min_waste),
                    utilization_percent,
                });
            }
            Op::Reserve(n) => {
                let region = buf.reserve_slice(usize::from(n)).unwrap();
                region.fill(0xAB);
                model.extend(std::iter::repeat_n(0xAB, usize::from(n)));
            }
            Op::Terminate => {
                let terminated = buf.as_slice_with_terminator().unwrap();
                assert_eq!(terminated.last(), Some(&0));
                assert_eq!(&terminated[..model.len()], model.as_slice());
            }
        }
        buf.check_invariants();
        assert_eq!(buf.as_slice(), model.as_slice());
    }

    drop(buf);
    let stats = pool.statistics();
    assert_eq!(stats.rents, stats.releases);
}

fuzz_target!(|input: Input| run(input));
