//! Stateless algorithms over slices.
//!
//! Slices are the bounded views everything in this crate operates on: a
//! non-owning pointer plus length with checked indexing. None of these
//! functions keep state between calls or touch a
//! [`GrowableBuffer`](crate::GrowableBuffer).

pub mod aggregate;
pub mod cast;
pub mod fill;
pub mod search;

pub use aggregate::{
    Numeric, Widening, average, long_sum, max, max_by, min, min_by, sum, wrapping_sum,
};
pub use cast::{cast_slice, cast_slice_mut, layout_compatible};
pub use fill::{fill_sequential, fill_sequential_by};
pub use search::{
    contains, contains_by, index_of, index_of_by, index_of_subslice, last_index_of,
    last_index_of_subslice,
};
