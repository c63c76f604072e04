//! Fuzz target for loading and cleaning delimited text.
//!
//! Loading may fail on malformed input, but must never panic, and a
//! successful clean must leave no -9999 in a numeric column.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nodata::Cleaner;
use nodata::repair::SentinelDetector;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let Ok(mut temp_file) = tempfile::Builder::new().suffix(".csv").tempfile() else {
        return;
    };
    if temp_file.write_all(data).is_err() {
        return;
    }

    let cleaner = Cleaner::new();
    if let Ok(loaded) = cleaner.load(temp_file.path()) {
        let cleaned = cleaner.clean(&loaded);
        assert_eq!(
            SentinelDetector::detect(cleaned.dataset(), &cleaned.numeric).total(),
            0
        );
    }
});
