#![no_main]
use jstd_path::{SOURCE_EXTENSION, demangle};
use libfuzzer_sys::fuzz_target;

/// Report identifiers are short; bound input to keep runs fast.
const MAX_INPUT_SIZE: usize = 4 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let path = demangle(s);
        assert!(path.ends_with(SOURCE_EXTENSION));
    }
});
