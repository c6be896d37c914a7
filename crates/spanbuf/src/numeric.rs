//! Standard numeric format strings, rendered with invariant-culture rules.
//!
//! A format string is a single specifier letter optionally followed by a
//! precision of one or two digits:
//!
//! | Specifier | Applies to | Precision means                     | Default |
//! |-----------|------------|-------------------------------------|---------|
//! | `G` / ``  | all        | significant digits (0 = shortest)   | shortest|
//! | `D`       | integers   | minimum digit count, zero padded    | 1       |
//! | `X` / `x` | integers   | minimum digit count, zero padded    | 1       |
//! | `F`       | all        | digits after the decimal point      | 2       |
//! | `N`       | all        | like `F`, with `,` group separators | 2       |
//! | `E` / `e` | all        | mantissa decimals; exponent >= 3 digits | 6   |
//! | `P`       | all        | like `F` after scaling by 100, plus `" %"` | 2 |
//! | `R`       | all        | ignored; shortest round-trip text   |         |
//!
//! Rendering happens in two steps: the value is written as ASCII into a
//! fixed-size scratch buffer on the stack, then widened into the caller's
//! UTF-16 destination. The scratch is sized for the longest possible output
//! (an `f64` near `MAX` under `N99`), so only the second step can run out of
//! room, and that is reported as `Ok(None)` for the caller to grow and retry.

use alloc::string::ToString;
use core::fmt::{self, Write};

use crate::{Result, error::BuilderError};

/// Longest rendering: 309 integer digits, 102 separators, sign, point and 99
/// decimals.
const SCRATCH_LEN: usize = 640;

/// Default decimals for `F`, `N` and `P`.
const DEFAULT_FIXED_PRECISION: usize = 2;

/// Default mantissa decimals for `E`.
const DEFAULT_EXPONENT_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Specifier {
    General,
    Decimal,
    Hex,
    Fixed,
    Number,
    Exponential,
    Percent,
    RoundTrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Spec {
    pub specifier: Specifier,
    /// Whether the specifier letter was upper case. Selects `A-F` vs `a-f`
    /// and `E` vs `e`.
    pub upper: bool,
    pub precision: Option<usize>,
}

impl Spec {
    const GENERAL: Spec = Spec {
        specifier: Specifier::General,
        upper: true,
        precision: None,
    };

    fn exponent_char(self) -> u8 {
        if self.upper { b'E' } else { b'e' }
    }
}

pub(crate) fn parse_spec(format: &str) -> Result<Spec> {
    let invalid = || BuilderError::InvalidSpecifier(format.to_string());

    let Some((&letter, digits)) = format.as_bytes().split_first() else {
        return Ok(Spec::GENERAL);
    };
    let specifier = match letter.to_ascii_uppercase() {
        b'G' => Specifier::General,
        b'D' => Specifier::Decimal,
        b'X' => Specifier::Hex,
        b'F' => Specifier::Fixed,
        b'N' => Specifier::Number,
        b'E' => Specifier::Exponential,
        b'P' => Specifier::Percent,
        b'R' => Specifier::RoundTrip,
        _ => return Err(invalid()),
    };
    let precision = match *digits {
        [] => None,
        [d] if d.is_ascii_digit() => Some(usize::from(d - b'0')),
        [hi, lo] if hi.is_ascii_digit() && lo.is_ascii_digit() => {
            Some(usize::from(hi - b'0') * 10 + usize::from(lo - b'0'))
        }
        _ => return Err(invalid()),
    };
    Ok(Spec {
        specifier,
        upper: letter.is_ascii_uppercase(),
        precision,
    })
}

// ------------------------------------------------------------------------------------------------
// Scratch
// ------------------------------------------------------------------------------------------------

/// Fixed-capacity ASCII buffer. Writing past the end fails rather than
/// truncating.
pub(crate) struct AsciiBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> AsciiBuf<N> {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn push(&mut self, byte: u8) -> fmt::Result {
        let slot = self.buf.get_mut(self.len).ok_or(fmt::Error)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    fn extend(&mut self, bytes: &[u8]) -> fmt::Result {
        let end = self.len + bytes.len();
        self.buf.get_mut(self.len..end).ok_or(fmt::Error)?.copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    fn zeros(&mut self, count: usize) -> fmt::Result {
        let end = self.len + count;
        self.buf.get_mut(self.len..end).ok_or(fmt::Error)?.fill(b'0');
        self.len = end;
        Ok(())
    }

    /// Widens the content into `dest`. `None` if `dest` is too short.
    pub(crate) fn copy_to(&self, dest: &mut [u16]) -> Option<usize> {
        let bytes = self.as_bytes();
        let dest = dest.get_mut(..bytes.len())?;
        for (unit, &byte) in dest.iter_mut().zip(bytes) {
            *unit = u16::from(byte);
        }
        Some(bytes.len())
    }
}

impl<const N: usize> Write for AsciiBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.extend(s.as_bytes())
    }
}

type Scratch = AsciiBuf<SCRATCH_LEN>;

/// Enough for the 39 digits of `u128::MAX` plus a rounding carry.
type Digits = AsciiBuf<48>;

fn scratch_overflow(_: fmt::Error) -> BuilderError {
    BuilderError::InvalidArgument {
        name: "format",
        reason: "formatted value does not fit the scratch buffer",
    }
}

// ------------------------------------------------------------------------------------------------
// Integers
// ------------------------------------------------------------------------------------------------

/// An integer split into the pieces the renderers need.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntParts {
    pub negative: bool,
    pub magnitude: u128,
    /// The value's bits at its native width, for `X`.
    pub bits: u128,
}

pub(crate) fn format_integer(parts: IntParts, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
    let spec = parse_spec(format)?;
    let mut out = Scratch::new();
    render_integer(&mut out, parts, spec).map_err(scratch_overflow)?;
    Ok(out.copy_to(dest))
}

fn render_integer(out: &mut Scratch, parts: IntParts, spec: Spec) -> fmt::Result {
    if spec.specifier == Specifier::Hex {
        let width = spec.precision.unwrap_or(1);
        return if spec.upper {
            write!(out, "{:0width$X}", parts.bits)
        } else {
            write!(out, "{:0width$x}", parts.bits)
        };
    }

    let mut digits = Digits::new();
    write!(digits, "{}", parts.magnitude)?;
    let digits = digits.as_bytes();

    if parts.negative {
        out.push(b'-')?;
    }
    match spec.specifier {
        Specifier::General | Specifier::RoundTrip => match spec.precision {
            Some(precision) if precision > 0 && digits.len() > precision => {
                let (rounded, carry) = round_digits(digits, precision)?;
                let exponent = exponent_of(digits.len(), carry);
                write_general(out, trim_zeros(rounded.as_bytes()), exponent, true, spec.exponent_char())
            }
            _ => out.extend(digits),
        },
        Specifier::Decimal => {
            let width = spec.precision.unwrap_or(1);
            out.zeros(width.saturating_sub(digits.len()))?;
            out.extend(digits)
        }
        Specifier::Fixed => {
            out.extend(digits)?;
            write_zero_decimals(out, spec.precision.unwrap_or(DEFAULT_FIXED_PRECISION))
        }
        Specifier::Number => {
            write_grouped(out, digits)?;
            write_zero_decimals(out, spec.precision.unwrap_or(DEFAULT_FIXED_PRECISION))
        }
        Specifier::Exponential => {
            let decimals = spec.precision.unwrap_or(DEFAULT_EXPONENT_PRECISION);
            let (rounded, carry) = round_digits(digits, decimals + 1)?;
            let rounded = rounded.as_bytes();
            let (first, rest) = rounded.split_first().ok_or(fmt::Error)?;
            out.push(*first)?;
            if decimals > 0 {
                out.push(b'.')?;
                out.extend(rest)?;
                out.zeros(decimals.saturating_sub(rest.len()))?;
            }
            write_exponent(out, spec.exponent_char(), exponent_of(digits.len(), carry), 3)
        }
        Specifier::Percent => {
            let mut scaled = Digits::new();
            scaled.extend(digits)?;
            if parts.magnitude != 0 {
                scaled.extend(b"00")?;
            }
            write_grouped(out, scaled.as_bytes())?;
            write_zero_decimals(out, spec.precision.unwrap_or(DEFAULT_FIXED_PRECISION))?;
            out.extend(b" %")
        }
        Specifier::Hex => Ok(()),
    }
}

fn exponent_of(digit_count: usize, carry: bool) -> i32 {
    let exponent = i32::try_from(digit_count).unwrap_or(i32::MAX) - 1;
    if carry { exponent + 1 } else { exponent }
}

fn write_zero_decimals(out: &mut Scratch, decimals: usize) -> fmt::Result {
    if decimals > 0 {
        out.push(b'.')?;
        out.zeros(decimals)?;
    }
    Ok(())
}

/// Keeps the first `keep` significant digits, rounding half away from zero.
/// The flag is set when rounding carried into a new leading digit
/// (`999` -> `100`), which raises the exponent by one.
fn round_digits(digits: &[u8], keep: usize) -> Result<(Digits, bool), fmt::Error> {
    let mut rounded = Digits::new();
    if keep >= digits.len() {
        rounded.extend(digits)?;
        return Ok((rounded, false));
    }

    rounded.extend(&digits[..keep])?;
    if digits[keep] < b'5' {
        return Ok((rounded, false));
    }
    for digit in rounded.buf[..rounded.len].iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return Ok((rounded, false));
        }
    }
    // Every kept digit was a nine.
    if let Some(first) = rounded.buf[..rounded.len].first_mut() {
        *first = b'1';
    }
    Ok((rounded, true))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let end = digits.iter().rposition(|&d| d != b'0').map_or(1, |last| last + 1);
    &digits[..end.min(digits.len())]
}

fn write_grouped(out: &mut Scratch, digits: &[u8]) -> fmt::Result {
    let lead = match digits.len() % 3 {
        0 => 3.min(digits.len()),
        n => n,
    };
    out.extend(&digits[..lead])?;
    for group in digits[lead..].chunks(3) {
        out.push(b',')?;
        out.extend(group)?;
    }
    Ok(())
}

fn write_exponent(out: &mut Scratch, marker: u8, exponent: i32, min_digits: usize) -> fmt::Result {
    out.push(marker)?;
    out.push(if exponent < 0 { b'-' } else { b'+' })?;
    write!(out, "{:0min_digits$}", exponent.unsigned_abs())
}

/// Writes significant `digits` scaled by `10^exponent`, either in scientific
/// notation or positionally.
fn write_general(out: &mut Scratch, digits: &[u8], exponent: i32, scientific: bool, marker: u8) -> fmt::Result {
    let Some((first, rest)) = digits.split_first() else {
        return out.push(b'0');
    };

    if scientific {
        out.push(*first)?;
        if !rest.is_empty() {
            out.push(b'.')?;
            out.extend(rest)?;
        }
        return write_exponent(out, marker, exponent, 2);
    }

    if exponent >= 0 {
        let int_len = exponent.unsigned_abs() as usize + 1;
        if digits.len() <= int_len {
            out.extend(digits)?;
            out.zeros(int_len - digits.len())
        } else {
            out.extend(&digits[..int_len])?;
            out.push(b'.')?;
            out.extend(&digits[int_len..])
        }
    } else {
        out.extend(b"0.")?;
        out.zeros(exponent.unsigned_abs() as usize - 1)?;
        out.extend(digits)
    }
}

// ------------------------------------------------------------------------------------------------
// Floats
// ------------------------------------------------------------------------------------------------

/// What the renderers need from `f32` and `f64`.
pub(crate) trait FloatRepr: Copy + fmt::Display + fmt::LowerExp {
    /// Decimal exponent from which the shortest `G` form switches to
    /// scientific notation.
    const SCIENTIFIC_FROM: i32;

    fn non_finite(self) -> Option<&'static str>;

    fn times_hundred(self) -> Self;
}

macro_rules! impl_float_repr {
    ($($t:ty => $from:expr),* $(,)?) => {
        $(
            impl FloatRepr for $t {
                const SCIENTIFIC_FROM: i32 = $from;

                fn non_finite(self) -> Option<&'static str> {
                    if self.is_nan() {
                        Some("NaN")
                    } else if self.is_infinite() {
                        Some(if self < 0.0 { "-Infinity" } else { "Infinity" })
                    } else {
                        None
                    }
                }

                fn times_hundred(self) -> Self {
                    self * 100.0
                }
            }
        )*
    };
}

impl_float_repr!(f32 => 7, f64 => 15);

pub(crate) fn format_float<F: FloatRepr>(value: F, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
    let spec = parse_spec(format)?;
    if matches!(spec.specifier, Specifier::Decimal | Specifier::Hex) {
        return Err(BuilderError::InvalidSpecifier(format.to_string()));
    }
    let mut out = Scratch::new();
    render_float(&mut out, value, spec).map_err(scratch_overflow)?;
    Ok(out.copy_to(dest))
}

fn render_float<F: FloatRepr>(out: &mut Scratch, value: F, spec: Spec) -> fmt::Result {
    if let Some(text) = value.non_finite() {
        return out.write_str(text);
    }

    match spec.specifier {
        Specifier::General | Specifier::RoundTrip => {
            let precision = match spec.specifier {
                Specifier::General => spec.precision.filter(|&p| p > 0),
                _ => None,
            };
            let mut sci = Scratch::new();
            match precision {
                Some(p) => write!(sci, "{:.*e}", p - 1, value)?,
                None => write!(sci, "{value:e}")?,
            }
            let parsed = ParsedExp::parse(sci.as_bytes())?;
            let limit = precision.map_or(F::SCIENTIFIC_FROM, |p| i32::try_from(p).unwrap_or(i32::MAX));
            let scientific = parsed.exponent >= limit || parsed.exponent < -4;
            if parsed.negative {
                out.push(b'-')?;
            }
            write_general(
                out,
                trim_zeros(parsed.digits.as_bytes()),
                parsed.exponent,
                scientific,
                spec.exponent_char(),
            )
        }
        Specifier::Fixed => {
            write!(out, "{:.*}", spec.precision.unwrap_or(DEFAULT_FIXED_PRECISION), value)
        }
        Specifier::Number => write_grouped_fixed(out, value, spec),
        Specifier::Exponential => {
            let mut sci = Scratch::new();
            write!(sci, "{:.*e}", spec.precision.unwrap_or(DEFAULT_EXPONENT_PRECISION), value)?;
            let text = sci.as_bytes();
            let split = text.iter().position(|&b| b == b'e').ok_or(fmt::Error)?;
            out.extend(&text[..split])?;
            let exponent = parse_exponent(&text[split + 1..])?;
            write_exponent(out, spec.exponent_char(), exponent, 3)
        }
        Specifier::Percent => {
            let scaled = value.times_hundred();
            if let Some(text) = scaled.non_finite() {
                out.write_str(text)?;
            } else {
                write_grouped_fixed(out, scaled, spec)?;
            }
            out.extend(b" %")
        }
        Specifier::Decimal | Specifier::Hex => Err(fmt::Error),
    }
}

/// Fixed-point rendering with `,` between groups of integer digits.
fn write_grouped_fixed<F: FloatRepr>(out: &mut Scratch, value: F, spec: Spec) -> fmt::Result {
    let mut fixed = Scratch::new();
    write!(fixed, "{:.*}", spec.precision.unwrap_or(DEFAULT_FIXED_PRECISION), value)?;
    let text = fixed.as_bytes();
    let unsigned = match text.split_first() {
        Some((b'-', rest)) => {
            out.push(b'-')?;
            rest
        }
        _ => text,
    };
    let int_len = unsigned.iter().position(|&b| b == b'.').unwrap_or(unsigned.len());
    write_grouped(out, &unsigned[..int_len])?;
    out.extend(&unsigned[int_len..])
}

/// `LowerExp` output (`-1.25e-7`) split into sign, significant digits and
/// exponent.
struct ParsedExp {
    negative: bool,
    digits: AsciiBuf<128>,
    exponent: i32,
}

impl ParsedExp {
    fn parse(text: &[u8]) -> Result<Self, fmt::Error> {
        let (negative, text) = match text.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, text),
        };
        let split = text.iter().position(|&b| b == b'e').ok_or(fmt::Error)?;
        let mut digits = AsciiBuf::new();
        for &byte in text[..split].iter().filter(|b| b.is_ascii_digit()) {
            digits.push(byte)?;
        }
        Ok(Self {
            negative,
            digits,
            exponent: parse_exponent(&text[split + 1..])?,
        })
    }
}

fn parse_exponent(text: &[u8]) -> Result<i32, fmt::Error> {
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(fmt::Error);
    }
    let magnitude = digits.iter().try_fold(0i32, |acc, &d| {
        if d.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add(i32::from(d - b'0'))
        } else {
            None
        }
    });
    let magnitude = magnitude.ok_or(fmt::Error)?;
    Ok(if negative { -magnitude } else { magnitude })
}
