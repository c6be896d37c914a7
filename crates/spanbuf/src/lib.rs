//! Growable code-unit buffers that start on caller-supplied memory and fall
//! back to pooled stores, with formatting and slice algorithms on top.
//!
//! - [`GrowableBuffer`] / [`ValueStringBuilder`]: the buffer itself and its
//!   UTF-16 text alias.
//! - [`SpanFormattable`] and [`Arg`]: appending formatted values, with
//!   alignment and standard numeric format strings.
//! - [`CompositeFormat`] and [`GrowableBuffer::append_format`]:
//!   `"{0,-8:N2}"`-style templates.
//! - [`span`]: aggregation, search, sequential fill and reinterpretation over
//!   plain slices.
//!
//! ```rust
//! use spanbuf::{Arg, ValueStringBuilder};
//!
//! let mut scratch = [0u16; 64];
//! let mut sb = ValueStringBuilder::from_view(&mut scratch);
//! sb.append_format("{0} costs {1:F2}", &[Arg::from("tea"), Arg::value(&3.5)])?;
//! assert_eq!(sb, "tea costs 3.50");
//! assert!(!sb.is_pooled());
//! # Ok::<(), spanbuf::BuilderError>(())
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod bridge;
mod builder;
mod composite;
mod error;
mod numeric;
mod options;

pub mod growth;
pub mod pool;
pub mod span;

#[cfg(test)]
mod tests;

pub use bridge::{Arg, SpanFormattable};
pub use builder::{GrowableBuffer, ValueStringBuilder};
pub use composite::{CompositeFormat, format};
pub use error::{BuilderError, FormatError, FormatErrorKind, SpanError};
pub use growth::MAX_CAPACITY;
pub use options::{FormatLimits, TrimPolicy};
pub use pool::{BufferPool, HeapPool, PoolStats, SlabPool};

/// Result type used throughout the crate.
pub type Result<T, E = BuilderError> = core::result::Result<T, E>;
