use alloc::{string::String, vec::Vec};

use rstest::rstest;

use super::*;
use crate::{SpanFormattable, ValueStringBuilder};

fn render(template: &str, args: &[Arg<'_>]) -> Result<String> {
    format(template, args)
}

fn kind_of(template: &str) -> FormatErrorKind {
    match CompositeFormat::parse(template) {
        Ok(parsed) => panic!("{template:?} parsed as {parsed:?}"),
        Err(error) => error.kind().clone(),
    }
}

#[rstest]
#[case("", "")]
#[case("plain", "plain")]
#[case("{0}", "x")]
#[case("{0} and {1,5}", "x and     y")]
#[case("{1}{0}{1}", "yxy")]
#[case("{{literal}}", "{literal}")]
#[case("}}{{", "}{")]
#[case("[{0,-3}]", "[x  ]")]
#[case("[{0 , 3 }]", "[  x]")]
#[case("[{0,  -2}]", "[x ]")]
#[case("{0:anything}", "x")]
fn templates(#[case] template: &str, #[case] expected: &str) {
    let args = [Arg::from("x"), Arg::from("y")];
    assert_eq!(render(template, &args).unwrap(), expected);
    let parsed = CompositeFormat::parse(template).unwrap();
    assert_eq!(parsed.format(&args).unwrap(), expected);
}

#[rstest]
#[case("{0:N2}", "1,234.57")]
#[case("{0,10:F1}", "    1234.6")]
#[case("{0:E2}", "1.23E+003")]
#[case("{0:P0}", "123,457 %")]
fn numeric_holes(#[case] template: &str, #[case] expected: &str) {
    assert_eq!(render(template, &[Arg::value(&1234.5678)]).unwrap(), expected);
}

#[test]
fn escaped_closing_brace_inside_format() {
    struct Echo;

    impl SpanFormattable for Echo {
        fn try_format(&self, dest: &mut [u16], format: &str) -> Result<Option<usize>> {
            format.try_format(dest, "")
        }
    }

    assert_eq!(render("<{0:a}}b}>", &[Arg::value(&Echo)]).unwrap(), "<a}b>");
    let parsed = CompositeFormat::parse("<{0:a}}b}>").unwrap();
    assert_eq!(parsed.format(&[Arg::value(&Echo)]).unwrap(), "<a}b>");
}

#[rstest]
#[case("}", FormatErrorKind::UnexpectedClosingBrace)]
#[case("a}b", FormatErrorKind::UnexpectedClosingBrace)]
#[case("{", FormatErrorKind::UnclosedHole)]
#[case("{0", FormatErrorKind::UnclosedHole)]
#[case("{0:abc", FormatErrorKind::UnclosedHole)]
#[case("{}", FormatErrorKind::ExpectedIndex)]
#[case("{x}", FormatErrorKind::ExpectedIndex)]
#[case("{ 0}", FormatErrorKind::ExpectedIndex)]
#[case("{0,}", FormatErrorKind::ExpectedAlignment)]
#[case("{0,-}", FormatErrorKind::ExpectedAlignment)]
#[case("{0,x}", FormatErrorKind::ExpectedAlignment)]
#[case("{0x}", FormatErrorKind::UnexpectedCharacter('x'))]
#[case("{0 1}", FormatErrorKind::UnexpectedCharacter('1'))]
#[case("{0,5 5}", FormatErrorKind::UnexpectedCharacter('5'))]
#[case("{0,5,5}", FormatErrorKind::UnexpectedCharacter(','))]
#[case("{0:a{b}", FormatErrorKind::NestedBrace)]
#[case("{1000000}", FormatErrorKind::IndexLimitExceeded(1_000_000))]
#[case("{0,1000000}", FormatErrorKind::AlignmentLimitExceeded(1_000_000))]
fn malformed_templates(#[case] template: &str, #[case] expected: FormatErrorKind) {
    assert_eq!(kind_of(template), expected);
}

#[test]
fn error_positions_are_byte_offsets() {
    let error = CompositeFormat::parse("héllo {0,x}").unwrap_err();
    assert_eq!(error.position, 10);
    insta::assert_snapshot!(error.to_string(), @"expected alignment at position 10");

    let error = CompositeFormat::parse("{0} }").unwrap_err();
    insta::assert_snapshot!(error.to_string(), @"unexpected closing brace at position 4");
}

#[test]
fn limits_are_configurable() {
    let tight = FormatLimits {
        max_index: 2,
        max_alignment: 4,
    };
    assert!(CompositeFormat::parse_with_limits("{1,3}", tight).is_ok());
    assert_eq!(
        CompositeFormat::parse_with_limits("{2}", tight).unwrap_err().kind(),
        &FormatErrorKind::IndexLimitExceeded(2)
    );
    assert_eq!(
        CompositeFormat::parse_with_limits("{0,-4}", tight).unwrap_err().kind(),
        &FormatErrorKind::AlignmentLimitExceeded(4)
    );
}

#[test]
fn streaming_keeps_output_before_a_missing_argument() {
    let mut sb = ValueStringBuilder::with_capacity(16).unwrap();
    let err = sb.append_format("a{0}b{3}c", &[Arg::from("x")]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"argument index 3 out of range for 1 arguments at position 5");
    assert_eq!(sb, "axb");
}

#[test]
fn pre_parsed_checks_arguments_before_writing() {
    let parsed = CompositeFormat::parse("a{0}b{3}c").unwrap();
    assert_eq!(parsed.minimum_argument_count(), 4);
    assert_eq!(parsed.hole_count(), 2);

    let mut sb = ValueStringBuilder::with_capacity(16).unwrap();
    let err = sb.append_composite(&parsed, &[Arg::from("x")]).unwrap_err();
    assert_eq!(
        err,
        BuilderError::Format(FormatError::new(
            FormatErrorKind::IndexOutOfRange { index: 3, count: 1 },
            5
        ))
    );
    assert!(sb.is_empty());
}

#[test]
fn pre_parsed_is_reusable() {
    let parsed: CompositeFormat = "{0}={1:D3};".parse().unwrap();
    let mut sb = ValueStringBuilder::with_capacity(4).unwrap();
    for (key, value) in [("a", 1), ("b", 22)] {
        sb.append_composite(&parsed, &[Arg::from(key), Arg::value(&value)])
            .unwrap();
    }
    assert_eq!(sb, "a=001;b=022;");
}

#[test]
fn null_and_display_arguments() {
    let items: Vec<u8> = alloc::vec![1, 2];
    let len = items.len();
    let rendered = render(
        "[{0,3}][{1}][{2,-4}]",
        &[Arg::Null, Arg::display(&'c'), Arg::display(&len)],
    )
    .unwrap();
    assert_eq!(rendered, "[   ][c][2   ]");
}

#[test]
fn invalid_value_format_surfaces_from_the_hole() {
    assert_eq!(
        render("{0:Z}", &[Arg::value(&1)]),
        Err(BuilderError::InvalidSpecifier("Z".into()))
    );
}

#[test]
fn parsed_template_merges_escaped_literals() {
    let parsed = CompositeFormat::parse("a{{b}}c").unwrap();
    assert_eq!(parsed.segments.len(), 1);
    assert_eq!(parsed.minimum_argument_count(), 0);
    assert_eq!(parsed.format(&[]).unwrap(), "a{b}c");
}
