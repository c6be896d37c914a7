use alloc::string::String;

use thiserror::Error;

/// Errors raised by [`GrowableBuffer`](crate::GrowableBuffer) operations and
/// the formatting layers built on top of it.
///
/// Every range or argument check happens before the first write, so an
/// operation that fails with [`InvalidArgument`](Self::InvalidArgument) or
/// [`ArgumentOutOfRange`](Self::ArgumentOutOfRange) leaves the buffer as it
/// was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// An argument has a value the operation cannot accept.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// An index, count or length falls outside the valid range.
    #[error("argument `{name}` = {value} is outside {min}..={max}")]
    ArgumentOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// Smallest accepted value.
        min: usize,
        /// Largest accepted value.
        max: usize,
    },
    /// The buffer would need more than
    /// [`MAX_CAPACITY`](crate::MAX_CAPACITY) elements.
    #[error("requested capacity {requested} exceeds the maximum of {max}")]
    CapacityExceeded {
        /// Capacity the operation needed.
        requested: usize,
        /// The hard limit.
        max: usize,
    },
    /// A value does not understand its format string.
    #[error("invalid format specifier {0:?}")]
    InvalidSpecifier(String),
    /// A composite format template is malformed or refers to a missing
    /// argument.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl BuilderError {
    pub(crate) fn out_of_range(name: &'static str, value: usize, max: usize) -> Self {
        BuilderError::ArgumentOutOfRange {
            name,
            value,
            min: 0,
            max,
        }
    }
}

/// A malformed composite format template, or a template that refers to an
/// argument that was not supplied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct FormatError {
    pub(crate) kind: FormatErrorKind,
    /// Byte offset into the template where the problem was detected.
    pub position: usize,
}

impl FormatError {
    pub(crate) fn new(kind: FormatErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }
}

/// The specific problem behind a [`FormatError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// A `}` outside a hole that is not doubled.
    #[error("unexpected closing brace")]
    UnexpectedClosingBrace,
    /// The template ended inside a hole.
    #[error("unclosed format item")]
    UnclosedHole,
    /// A hole does not start with a decimal index.
    #[error("expected argument index")]
    ExpectedIndex,
    /// A `,` is not followed by a signed decimal width.
    #[error("expected alignment")]
    ExpectedAlignment,
    /// A character that cannot appear at this point of a hole.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// A `{` inside a format string.
    #[error("nested brace in format specifier")]
    NestedBrace,
    /// The index reached [`FormatLimits::max_index`](crate::FormatLimits::max_index).
    #[error("argument index exceeds the limit of {0}")]
    IndexLimitExceeded(usize),
    /// The alignment width reached
    /// [`FormatLimits::max_alignment`](crate::FormatLimits::max_alignment).
    #[error("alignment exceeds the limit of {0}")]
    AlignmentLimitExceeded(usize),
    /// A hole names an argument that was not supplied.
    #[error("argument index {index} out of range for {count} arguments")]
    IndexOutOfRange {
        /// The index in the template.
        index: usize,
        /// Number of arguments supplied.
        count: usize,
    },
}

/// Errors from the aggregate functions in [`span`](crate::span).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanError {
    /// The input slice is empty.
    #[error("sequence contains no elements")]
    Empty,
    /// The result does not fit the element type.
    #[error("arithmetic overflow")]
    Overflow,
}
