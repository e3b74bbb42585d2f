#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing and conversion return errors, never panic
        if let Ok(c) = criteria_bson::criteria::parse_criteria_json(s) {
            let _ = criteria_bson::convert(&c);
        }
    }
});
