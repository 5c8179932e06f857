//! Fuzz target for surefire report parsing.
//!
//! Feeds arbitrary documents to `parse_report()`. Any input may be
//! rejected, but parsing must not panic and every parsed case must carry
//! a non-empty identifier.

#![no_main]
use jstd_parsing::parse_report;
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_SIZE: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE {
        return;
    }
    if let Ok(xml) = std::str::from_utf8(data)
        && let Ok(reports) = parse_report(xml, Some("Fallback_1_Linux.FuzzTest"))
    {
        for report in reports {
            assert!(!report.identifier.is_empty());
            assert!(!report.cases.is_empty());
        }
    }
});
