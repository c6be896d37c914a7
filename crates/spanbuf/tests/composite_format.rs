#![allow(missing_docs)]

mod common;

use common::CountingPool;
use spanbuf::{Arg, BuilderError, CompositeFormat, FormatErrorKind, ValueStringBuilder};

#[test]
fn holes_and_alignment() {
    let rendered = spanbuf::format("{0} and {1,5}", &[Arg::from("x"), Arg::from("y")]).unwrap();
    assert_eq!(rendered, "x and     y");
}

#[test]
fn escaped_braces() {
    assert_eq!(spanbuf::format("{{literal}}", &[]).unwrap(), "{literal}");
}

#[test]
fn numeric_format_in_hole() {
    let value = 1_234_567.891f64;
    assert_eq!(
        spanbuf::format("{0:N2}", &[Arg::value(&value)]).unwrap(),
        "1,234,567.89"
    );
}

#[test]
fn index_past_the_arguments() {
    let err = spanbuf::format("{0} {1}", &[Arg::from("only")]).unwrap_err();
    let BuilderError::Format(format_error) = err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(
        format_error.kind(),
        &FormatErrorKind::IndexOutOfRange { index: 1, count: 1 }
    );
    assert_eq!(format_error.position, 4);
}

#[test]
fn report_table() {
    let row = CompositeFormat::parse("{0,-10}|{1,6:D3}|{2,10:F2}\n").unwrap();
    let pool = CountingPool::default();
    let mut scratch = [0u16; 128];
    let mut sb = ValueStringBuilder::from_view_in(&mut scratch, &pool);
    for (name, qty, price) in [("apples", 3, 1.5), ("kiwis", 12, 0.25), ("melons", 1, 4.0)] {
        sb.append_composite(&row, &[Arg::from(name), Arg::value(&qty), Arg::value(&price)])
            .unwrap();
    }
    insta::assert_snapshot!(sb.to_string().trim_end(), @r"
    apples    |   003|      1.50
    kiwis     |   012|      0.25
    melons    |   001|      4.00
    ");
    // The three rows fit the stack scratch.
    assert_eq!(pool.rents(), 0);
}

#[test]
fn mixed_literal_and_formatted_appends() {
    let mut sb = ValueStringBuilder::with_capacity(8).unwrap();
    let elapsed = 0.042_f64;
    sb.append_literal("done in ").unwrap();
    sb.append_formatted(&(elapsed * 1000.0), 0, "F1").unwrap();
    sb.append_literal("ms (").unwrap();
    sb.append_formatted(&0.125f64, 0, "P1").unwrap();
    sb.append_literal(")").unwrap();
    assert_eq!(sb, "done in 42.0ms (12.5 %)");
}
