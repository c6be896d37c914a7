//! Composite format templates: `"{0} and {1,5:F2}"`.
//!
//! A template is literal text with holes. A hole is
//! `{index[,alignment][:format]}`:
//! - `index` selects the argument, counting from zero.
//! - `alignment` is a signed width; positive right-justifies, negative
//!   left-justifies (see [`append_arg`](crate::GrowableBuffer::append_arg)).
//! - `format` is handed to the argument unchanged, up to the closing brace.
//!
//! `{{` and `}}` outside holes stand for literal braces. Inside a format
//! string `}}` stands for `}` and `{` is an error. Spaces may follow the index,
//! the comma and the alignment.
//!
//! Templates are scanned once, left to right. [`GrowableBuffer::append_format`]
//! emits output while scanning, so an error part-way through leaves the text
//! emitted up to that point. [`CompositeFormat`] scans ahead of time and can
//! then be applied any number of times; it checks the argument count before
//! writing anything.

#[cfg(test)]
mod tests;

use alloc::{
    borrow::Cow,
    string::{String, ToString},
    vec::Vec,
};

use crate::{
    Result,
    bridge::Arg,
    builder::{GrowableBuffer, ValueStringBuilder},
    error::{BuilderError, FormatError, FormatErrorKind},
    options::FormatLimits,
    pool::BufferPool,
};

/// Units of stack scratch [`CompositeFormat::format`] starts with.
const FORMAT_SCRATCH_LEN: usize = 256;

/// Scanner position within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanningLiteral,
    /// Just consumed a `{` that was not doubled.
    FoundBrace,
    ParsingIndex,
    ParsingAlignment,
    ParsingFormatSpec,
    /// Index (and maybe alignment) done; only spaces and a delimiter may
    /// follow.
    ClosingHole,
}

/// A hole as it is handed to a [`Sink`].
struct HoleRef<'t> {
    index: usize,
    alignment: i32,
    format: Cow<'t, str>,
    /// Byte offset of the hole's opening brace.
    position: usize,
}

/// Receives the pieces of a template as they are scanned.
trait Sink {
    type Error: From<FormatError>;

    fn literal(&mut self, text: &str) -> Result<(), Self::Error>;

    fn hole(&mut self, hole: HoleRef<'_>) -> Result<(), Self::Error>;
}

#[derive(Default)]
struct HoleState {
    start: usize,
    index: usize,
    negative: bool,
    alignment: usize,
    alignment_digits: usize,
    alignment_seen: bool,
    spec_start: usize,
    spec_escaped: bool,
}

impl HoleState {
    fn alignment(&self) -> i32 {
        let magnitude = i32::try_from(self.alignment).unwrap_or(i32::MAX);
        if self.negative { -magnitude } else { magnitude }
    }
}

fn scan<S: Sink>(template: &str, limits: FormatLimits, sink: &mut S) -> Result<(), S::Error> {
    let bytes = template.as_bytes();
    let fail = |kind, position| FormatError::new(kind, position);
    let unexpected = |position: usize| {
        let c = template[position..].chars().next().unwrap_or('\u{FFFD}');
        FormatError::new(FormatErrorKind::UnexpectedCharacter(c), position)
    };

    let mut state = State::ScanningLiteral;
    let mut literal_start = 0;
    let mut hole = HoleState::default();
    let mut pos = 0;

    while let Some(&byte) = bytes.get(pos) {
        match state {
            State::ScanningLiteral => match byte {
                b'{' => {
                    sink.literal(&template[literal_start..pos])?;
                    if bytes.get(pos + 1) == Some(&b'{') {
                        // The second brace opens the next literal run.
                        literal_start = pos + 1;
                        pos += 2;
                        continue;
                    }
                    hole = HoleState {
                        start: pos,
                        ..HoleState::default()
                    };
                    state = State::FoundBrace;
                }
                b'}' => {
                    if bytes.get(pos + 1) != Some(&b'}') {
                        return Err(fail(FormatErrorKind::UnexpectedClosingBrace, pos).into());
                    }
                    sink.literal(&template[literal_start..=pos])?;
                    literal_start = pos + 2;
                    pos += 2;
                    continue;
                }
                _ => {}
            },
            State::FoundBrace => {
                if !byte.is_ascii_digit() {
                    return Err(fail(FormatErrorKind::ExpectedIndex, pos).into());
                }
                hole.index = usize::from(byte - b'0');
                state = State::ParsingIndex;
            }
            State::ParsingIndex => match byte {
                b'0'..=b'9' => {
                    hole.index = hole
                        .index
                        .saturating_mul(10)
                        .saturating_add(usize::from(byte - b'0'));
                    if hole.index >= limits.max_index {
                        return Err(fail(FormatErrorKind::IndexLimitExceeded(limits.max_index), pos).into());
                    }
                }
                b' ' => state = State::ClosingHole,
                b',' => state = State::ParsingAlignment,
                b':' => {
                    hole.spec_start = pos + 1;
                    state = State::ParsingFormatSpec;
                }
                b'}' => {
                    emit_hole(template, &hole, pos, sink)?;
                    literal_start = pos + 1;
                    state = State::ScanningLiteral;
                }
                _ => return Err(unexpected(pos).into()),
            },
            State::ParsingAlignment => match byte {
                b' ' if hole.alignment_digits == 0 && !hole.negative => {}
                b'-' if hole.alignment_digits == 0 && !hole.negative => hole.negative = true,
                b'0'..=b'9' => {
                    hole.alignment = hole
                        .alignment
                        .saturating_mul(10)
                        .saturating_add(usize::from(byte - b'0'));
                    hole.alignment_digits += 1;
                    if hole.alignment >= limits.max_alignment {
                        return Err(
                            fail(FormatErrorKind::AlignmentLimitExceeded(limits.max_alignment), pos).into()
                        );
                    }
                }
                _ if hole.alignment_digits == 0 => {
                    return Err(fail(FormatErrorKind::ExpectedAlignment, pos).into());
                }
                b' ' => {
                    hole.alignment_seen = true;
                    state = State::ClosingHole;
                }
                b':' => {
                    hole.spec_start = pos + 1;
                    state = State::ParsingFormatSpec;
                }
                b'}' => {
                    emit_hole(template, &hole, pos, sink)?;
                    literal_start = pos + 1;
                    state = State::ScanningLiteral;
                }
                _ => return Err(unexpected(pos).into()),
            },
            State::ClosingHole => match byte {
                b' ' => {}
                b',' if !hole.alignment_seen => state = State::ParsingAlignment,
                b':' => {
                    hole.spec_start = pos + 1;
                    state = State::ParsingFormatSpec;
                }
                b'}' => {
                    emit_hole(template, &hole, pos, sink)?;
                    literal_start = pos + 1;
                    state = State::ScanningLiteral;
                }
                _ => return Err(unexpected(pos).into()),
            },
            State::ParsingFormatSpec => match byte {
                b'{' => return Err(fail(FormatErrorKind::NestedBrace, pos).into()),
                b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                    hole.spec_escaped = true;
                    pos += 2;
                    continue;
                }
                b'}' => {
                    emit_hole(template, &hole, pos, sink)?;
                    literal_start = pos + 1;
                    state = State::ScanningLiteral;
                }
                _ => {}
            },
        }
        pos += 1;
    }

    if state != State::ScanningLiteral {
        return Err(fail(FormatErrorKind::UnclosedHole, template.len()).into());
    }
    sink.literal(&template[literal_start..])
}

/// Hands a completed hole to the sink. `end` is the offset of its closing
/// brace.
fn emit_hole<S: Sink>(template: &str, hole: &HoleState, end: usize, sink: &mut S) -> Result<(), S::Error> {
    let format = if hole.spec_start == 0 {
        Cow::Borrowed("")
    } else {
        let raw = &template[hole.spec_start..end];
        if hole.spec_escaped {
            Cow::Owned(raw.replace("}}", "}"))
        } else {
            Cow::Borrowed(raw)
        }
    };
    sink.hole(HoleRef {
        index: hole.index,
        alignment: hole.alignment(),
        format,
        position: hole.start,
    })
}

// ------------------------------------------------------------------------------------------------
// Streaming
// ------------------------------------------------------------------------------------------------

struct BuilderSink<'b, 'a, 'args, P: BufferPool<u16>> {
    builder: &'b mut GrowableBuffer<'a, u16, P>,
    args: &'b [Arg<'args>],
}

impl<P: BufferPool<u16>> Sink for BuilderSink<'_, '_, '_, P> {
    type Error = BuilderError;

    fn literal(&mut self, text: &str) -> Result<()> {
        self.builder.append_str(text)
    }

    fn hole(&mut self, hole: HoleRef<'_>) -> Result<()> {
        let arg = lookup(self.args, hole.index, hole.position)?;
        self.builder.append_arg(arg, hole.alignment, &hole.format)
    }
}

fn lookup<'args>(args: &[Arg<'args>], index: usize, position: usize) -> Result<Arg<'args>, FormatError> {
    args.get(index).copied().ok_or_else(|| {
        FormatError::new(
            FormatErrorKind::IndexOutOfRange {
                index,
                count: args.len(),
            },
            position,
        )
    })
}

impl<P: BufferPool<u16>> GrowableBuffer<'_, u16, P> {
    /// Appends `template` with its holes replaced by `args`, scanning and
    /// emitting in one pass.
    ///
    /// # Errors
    ///
    /// [`BuilderError::Format`] for a malformed template or a hole whose
    /// index has no argument. Output emitted before the error is kept.
    pub fn append_format(&mut self, template: &str, args: &[Arg<'_>]) -> Result<()> {
        self.append_format_with_limits(template, FormatLimits::default(), args)
    }

    /// Like [`append_format`](Self::append_format) with explicit limits.
    ///
    /// # Errors
    ///
    /// As for [`append_format`](Self::append_format).
    pub fn append_format_with_limits(&mut self, template: &str, limits: FormatLimits, args: &[Arg<'_>]) -> Result<()> {
        scan(template, limits, &mut BuilderSink { builder: self, args })
    }

    /// Appends a pre-parsed template with its holes replaced by `args`.
    ///
    /// # Errors
    ///
    /// [`BuilderError::Format`] if `args` is shorter than
    /// [`CompositeFormat::minimum_argument_count`]; nothing is written in
    /// that case.
    pub fn append_composite(&mut self, format: &CompositeFormat, args: &[Arg<'_>]) -> Result<()> {
        format.check_args(args)?;
        for segment in &format.segments {
            match segment {
                Segment::Literal(range) => self.append_str(&format.text[range.clone()])?,
                Segment::Hole(hole) => {
                    let arg = lookup(args, hole.index, hole.position)?;
                    self.append_arg(arg, hole.alignment, &format.text[hole.format.clone()])?;
                }
            }
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Pre-parsed
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hole {
    index: usize,
    alignment: i32,
    /// Range of the unescaped format string in `CompositeFormat::text`.
    format: core::ops::Range<usize>,
    position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Range of unescaped literal text in `CompositeFormat::text`.
    Literal(core::ops::Range<usize>),
    Hole(Hole),
}

/// A template parsed once and applied many times.
///
/// # Examples
///
/// ```rust
/// use spanbuf::{Arg, CompositeFormat};
///
/// let row = CompositeFormat::parse("{0,-6}|{1,8:N1}")?;
/// assert_eq!(row.minimum_argument_count(), 2);
/// assert_eq!(row.format(&[Arg::from("rent"), Arg::value(&1234.5)])?, "rent  | 1,234.5");
/// # Ok::<(), spanbuf::BuilderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeFormat {
    /// Unescaped literal runs and format strings, back to back.
    text: String,
    segments: Vec<Segment>,
    minimum_argument_count: usize,
}

/// Collects segments while scanning.
#[derive(Default)]
struct ParseSink {
    text: String,
    segments: Vec<Segment>,
    minimum_argument_count: usize,
}

impl ParseSink {
    fn push_text(&mut self, s: &str) -> core::ops::Range<usize> {
        let start = self.text.len();
        self.text.push_str(s);
        start..self.text.len()
    }
}

impl Sink for ParseSink {
    type Error = FormatError;

    fn literal(&mut self, text: &str) -> Result<(), FormatError> {
        if text.is_empty() {
            return Ok(());
        }
        // Escapes split a run into adjacent pieces; merge them.
        if let Some(Segment::Literal(range)) = self.segments.last_mut() {
            if range.end == self.text.len() {
                self.text.push_str(text);
                range.end = self.text.len();
                return Ok(());
            }
        }
        let range = self.push_text(text);
        self.segments.push(Segment::Literal(range));
        Ok(())
    }

    fn hole(&mut self, hole: HoleRef<'_>) -> Result<(), FormatError> {
        let format = self.push_text(&hole.format);
        self.minimum_argument_count = self.minimum_argument_count.max(hole.index + 1);
        self.segments.push(Segment::Hole(Hole {
            index: hole.index,
            alignment: hole.alignment,
            format,
            position: hole.position,
        }));
        Ok(())
    }
}

impl CompositeFormat {
    /// Parses `template` under the default [`FormatLimits`].
    ///
    /// # Errors
    ///
    /// [`FormatError`] describing the first malformed construct.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        Self::parse_with_limits(template, FormatLimits::default())
    }

    /// Parses `template` under `limits`.
    ///
    /// # Errors
    ///
    /// [`FormatError`] describing the first malformed construct.
    pub fn parse_with_limits(template: &str, limits: FormatLimits) -> Result<Self, FormatError> {
        let mut sink = ParseSink::default();
        scan(template, limits, &mut sink)?;
        Ok(Self {
            text: sink.text,
            segments: sink.segments,
            minimum_argument_count: sink.minimum_argument_count,
        })
    }

    /// One more than the highest argument index referenced.
    #[must_use]
    pub fn minimum_argument_count(&self) -> usize {
        self.minimum_argument_count
    }

    /// Number of holes in the template.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Hole(_)))
            .count()
    }

    /// Renders into a new `String`, starting on stack scratch.
    ///
    /// # Errors
    ///
    /// As for [`GrowableBuffer::append_composite`].
    pub fn format(&self, args: &[Arg<'_>]) -> Result<String> {
        let mut scratch = [0u16; FORMAT_SCRATCH_LEN];
        let mut builder = ValueStringBuilder::from_view(&mut scratch);
        builder.append_composite(self, args)?;
        Ok(builder.to_string())
    }

    fn check_args(&self, args: &[Arg<'_>]) -> Result<(), FormatError> {
        if args.len() >= self.minimum_argument_count {
            return Ok(());
        }
        let first_missing = self.segments.iter().find_map(|segment| match segment {
            Segment::Hole(hole) if hole.index >= args.len() => Some(hole),
            _ => None,
        });
        let (index, position) = first_missing.map_or((self.minimum_argument_count - 1, 0), |hole| {
            (hole.index, hole.position)
        });
        Err(FormatError::new(
            FormatErrorKind::IndexOutOfRange {
                index,
                count: args.len(),
            },
            position,
        ))
    }
}

impl core::str::FromStr for CompositeFormat {
    type Err = FormatError;

    fn from_str(template: &str) -> Result<Self, FormatError> {
        Self::parse(template)
    }
}

impl TryFrom<&str> for CompositeFormat {
    type Error = FormatError;

    fn try_from(template: &str) -> Result<Self, FormatError> {
        Self::parse(template)
    }
}

/// Renders `template` with `args` into a new `String`.
///
/// # Errors
///
/// As for [`GrowableBuffer::append_format`].
pub fn format(template: &str, args: &[Arg<'_>]) -> Result<String> {
    let mut scratch = [0u16; FORMAT_SCRATCH_LEN];
    let mut builder = ValueStringBuilder::from_view(&mut scratch);
    builder.append_format(template, args)?;
    Ok(builder.to_string())
}
