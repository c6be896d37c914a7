//! Appending formatted values to a [`ValueStringBuilder`].
//!
//! Values reach the builder through one of two capabilities:
//! - [`SpanFormattable`] writes UTF-16 straight into the builder's spare
//!   capacity. If the spare region is too small the value says so, the
//!   builder grows (at least doubling) and asks again.
//! - [`Display`](fmt::Display) values are written through a
//!   [`fmt::Write`] adapter over the builder.
//!
//! Alignment pads the formatted value with spaces to a minimum width. A
//! positive alignment right-justifies, a negative one left-justifies, zero
//! does nothing. Right-justification formats the value in place and then
//! opens the padding gap in front of it.

use alloc::string::String;
use core::fmt;

use crate::{
    Result,
    builder::GrowableBuffer,
    error::BuilderError,
    numeric::{self, IntParts},
    pool::BufferPool,
};

/// Smallest growth step taken when a value does not fit the spare capacity.
const MIN_FORMAT_GROW: usize = 16;

/// A value that can render itself as UTF-16 into a caller-provided region.
///
/// # Contract
/// - On success, write the rendering to the front of `dest` and return
///   `Ok(Some(written))`, with `written <= dest.len()`.
/// - If `dest` is too short, return `Ok(None)`. The content of `dest` is
///   then ignored and the call is repeated with a longer region.
/// - Return `Err` only for problems that growing cannot fix, such as an
///   unsupported `format`.
///
/// # Examples
///
/// ```rust
/// use spanbuf::{Result, SpanFormattable, ValueStringBuilder};
///
/// struct Celsius(i32);
///
/// impl SpanFormattable for Celsius {
///     fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
///         let Some(written) = self.0.try_format(dest, format)? else {
///             return Ok(None);
///         };
///         let Some(unit) = dest.get_mut(written) else {
///             return Ok(None);
///         };
///         *unit = u16::from(b'C');
///         Ok(Some(written + 1))
///     }
/// }
///
/// let mut sb = ValueStringBuilder::with_capacity(2)?;
/// sb.append_formatted(&Celsius(-40), 6, "")?;
/// assert_eq!(sb, "  -40C");
/// # Ok::<(), spanbuf::BuilderError>(())
/// ```
pub trait SpanFormattable {
    /// Renders `self` into `dest` according to `format`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidSpecifier`] if `format` is not understood.
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>>;
}

impl<T: SpanFormattable + ?Sized> SpanFormattable for &T {
    #[inline]
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        (**self).try_format(dest, format)
    }
}

/// `None` renders as nothing.
impl<T: SpanFormattable> SpanFormattable for Option<T> {
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        match self {
            Some(value) => value.try_format(dest, format),
            None => Ok(Some(0)),
        }
    }
}

/// Text ignores the format string.
impl SpanFormattable for str {
    fn try_format(&self, dest: &mut [u16], _format: &str) -> Result<Option<usize>> {
        let mut written = 0;
        for unit in self.encode_utf16() {
            let Some(slot) = dest.get_mut(written) else {
                return Ok(None);
            };
            *slot = unit;
            written += 1;
        }
        Ok(Some(written))
    }
}

impl SpanFormattable for String {
    #[inline]
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        self.as_str().try_format(dest, format)
    }
}

impl SpanFormattable for char {
    fn try_format(&self, dest: &mut [u16], _format: &str) -> Result<Option<usize>> {
        if dest.len() < self.len_utf16() {
            return Ok(None);
        }
        Ok(Some(self.encode_utf16(dest).len()))
    }
}

impl SpanFormattable for bool {
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        let text = if *self { "true" } else { "false" };
        text.try_format(dest, format)
    }
}

macro_rules! impl_signed {
    ($($t:ty => $u:ty),* $(,)?) => {
        $(
            impl SpanFormattable for $t {
                #[allow(clippy::cast_sign_loss, clippy::cast_lossless)]
                fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
                    let parts = IntParts {
                        negative: *self < 0,
                        magnitude: self.unsigned_abs() as u128,
                        bits: *self as $u as u128,
                    };
                    numeric::format_integer(parts, dest, format)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),* $(,)?) => {
        $(
            impl SpanFormattable for $t {
                #[allow(clippy::cast_lossless)]
                fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
                    let parts = IntParts {
                        negative: false,
                        magnitude: *self as u128,
                        bits: *self as u128,
                    };
                    numeric::format_integer(parts, dest, format)
                }
            }
        )*
    };
}

impl_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128, isize => usize);
impl_unsigned!(u8, u16, u32, u64, u128, usize);

impl SpanFormattable for f32 {
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        numeric::format_float(*self, dest, format)
    }
}

impl SpanFormattable for f64 {
    fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
        numeric::format_float(*self, dest, format)
    }
}

/// One argument to a composite format or [`append_arg`](GrowableBuffer::append_arg).
///
/// The variants name the capability used to render the value, so an argument
/// that can neither format into a span nor display itself cannot be built.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    /// Renders as nothing. Alignment padding still applies.
    Null,
    /// Text, copied as-is.
    Str(&'a str),
    /// A value that formats directly into the builder.
    Value(&'a dyn SpanFormattable),
    /// A value written through [`fmt::Display`]. Format strings are ignored.
    Display(&'a dyn fmt::Display),
}

impl<'a> Arg<'a> {
    /// Wraps a [`SpanFormattable`] value.
    #[must_use]
    pub fn value(value: &'a dyn SpanFormattable) -> Self {
        Arg::Value(value)
    }

    /// Wraps a [`Display`](fmt::Display) value.
    #[must_use]
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Arg::Display(value)
    }

    /// Wraps a string.
    #[must_use]
    pub fn str(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Arg::Null, Arg::Str)
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => f.write_str("Null"),
            Arg::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Arg::Value(_) => f.write_str("Value(..)"),
            Arg::Display(d) => f.debug_tuple("Display").field(&format_args!("{d}")).finish(),
        }
    }
}

/// [`fmt::Write`] over a builder that keeps the [`BuilderError`] a failed
/// write produced, since `fmt::Error` carries nothing.
struct Capture<'b, 'a, P: BufferPool<u16>> {
    builder: &'b mut GrowableBuffer<'a, u16, P>,
    error: Option<BuilderError>,
}

impl<P: BufferPool<u16>> fmt::Write for Capture<'_, '_, P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.builder.append_str(s).map_err(|error| {
            self.error = Some(error);
            fmt::Error
        })
    }
}

impl<P: BufferPool<u16>> GrowableBuffer<'_, u16, P> {
    /// Appends `value` with its default format.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn append_value<V: SpanFormattable + ?Sized>(&mut self, value: &V) -> Result<()> {
        self.write_formattable(value, "")
    }

    /// Appends `value` rendered with `format`, padded to `|alignment|` code
    /// units.
    ///
    /// # Errors
    ///
    /// [`BuilderError::InvalidSpecifier`] for an unsupported `format`,
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    pub fn append_formatted<V: SpanFormattable + ?Sized>(
        &mut self,
        value: &V,
        alignment: i32,
        format: &str,
    ) -> Result<()> {
        let start = self.len();
        self.write_formattable(value, format)?;
        self.align_from(start, alignment)
    }

    /// Appends the [`Display`](fmt::Display) rendering of `value`, padded to
    /// `|alignment|` code units.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible,
    /// [`BuilderError::InvalidArgument`] if the `Display` implementation
    /// itself fails.
    pub fn append_display<V: fmt::Display + ?Sized>(&mut self, value: &V, alignment: i32) -> Result<()> {
        let start = self.len();
        self.write_display(format_args!("{value}"))?;
        self.align_from(start, alignment)
    }

    /// Appends pre-built [`fmt::Arguments`], as produced by `format_args!`.
    ///
    /// # Errors
    ///
    /// As for [`append_display`](Self::append_display).
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.write_display(args)
    }

    /// Appends `arg` using whichever capability it carries.
    ///
    /// `format` is passed to [`Arg::Value`] arguments and ignored by the
    /// others. [`Arg::Null`] contributes only padding.
    ///
    /// # Errors
    ///
    /// As for [`append_formatted`](Self::append_formatted).
    pub fn append_arg(&mut self, arg: Arg<'_>, alignment: i32, format: &str) -> Result<()> {
        let start = self.len();
        match arg {
            Arg::Null => {}
            Arg::Str(s) => self.append_str(s)?,
            Arg::Value(value) => self.write_formattable(value, format)?,
            Arg::Display(value) => self.write_display(format_args!("{value}"))?,
        }
        self.align_from(start, alignment)
    }

    /// Appends literal text, as the counterpart of
    /// [`append_formatted`](Self::append_formatted) when assembling output
    /// piece by piece.
    ///
    /// # Errors
    ///
    /// [`BuilderError::CapacityExceeded`] if growing is impossible.
    #[inline]
    pub fn append_literal(&mut self, literal: &str) -> Result<()> {
        self.append_str(literal)
    }

    /// Appends the `Display` renderings of `items`, separated by `separator`.
    ///
    /// # Errors
    ///
    /// As for [`append_display`](Self::append_display).
    pub fn append_join<I>(&mut self, separator: &str, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.append_str(separator)?;
            }
            self.write_display(format_args!("{item}"))?;
        }
        Ok(())
    }

    fn write_formattable<V: SpanFormattable + ?Sized>(&mut self, value: &V, format: &str) -> Result<()> {
        loop {
            let spare = self.remaining_mut().len();
            match value.try_format(self.remaining_mut(), format)? {
                Some(written) if written <= spare => return self.advance(written),
                Some(_) => {
                    return Err(BuilderError::InvalidArgument {
                        name: "value",
                        reason: "formatter reported more units than it was given",
                    });
                }
                None => self.grow((spare + 1).max(MIN_FORMAT_GROW))?,
            }
        }
    }

    fn write_display(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut capture = Capture {
            builder: self,
            error: None,
        };
        match fmt::write(&mut capture, args) {
            Ok(()) => Ok(()),
            Err(fmt::Error) => Err(capture.error.unwrap_or(BuilderError::InvalidArgument {
                name: "value",
                reason: "Display implementation returned an error",
            })),
        }
    }

    fn align_from(&mut self, start: usize, alignment: i32) -> Result<()> {
        let width = alignment.unsigned_abs() as usize;
        let written = self.len() - start;
        let Some(padding) = width.checked_sub(written).filter(|&p| p > 0) else {
            return Ok(());
        };
        if alignment > 0 {
            self.insert_spaces(start, padding)
        } else {
            self.push_spaces(padding)
        }
    }
}
