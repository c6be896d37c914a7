#![no_main]
//! Feeds arbitrary templates to the composite format scanner. Streaming and
//! pre-parsed rendering must agree, and neither may panic.

use libfuzzer_sys::fuzz_target;
use spanbuf::{Arg, CompositeFormat, FormatLimits, ValueStringBuilder};

fn run(data: &[u8]) {
    let Ok(template) = std::str::from_utf8(data) else {
        return;
    };
    let number = -1234.5f64;
    let count = 7u64;
    let args = [Arg::from("text"), Arg::value(&number), Arg::value(&count), Arg::Null];
    let limits = FormatLimits {
        max_index: 16,
        max_alignment: 256,
    };

    let mut streaming = ValueStringBuilder::with_capacity(16).unwrap();
    let streamed = streaming.append_format_with_limits(template, limits, &args);

    match CompositeFormat::parse_with_limits(template, limits) {
        Ok(parsed) => {
            let mut pre = ValueStringBuilder::with_capacity(16).unwrap();
            let rendered = pre.append_composite(&parsed, &args);
            assert_eq!(streamed.is_ok(), rendered.is_ok());
            if streamed.is_ok() {
                assert_eq!(streaming.as_slice(), pre.as_slice());
            } else if parsed.minimum_argument_count() > args.len() {
                // Argument checks run before any output.
                assert!(pre.is_empty());
            }
        }
        Err(error) => {
            assert!(streamed.is_err());
            assert!(error.position <= template.len());
        }
    }
}

fuzz_target!(|data: &[u8]| run(data));
