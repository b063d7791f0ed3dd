#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Validation of arbitrary decoded trees must not panic
        if let Ok(doc) = docgate::decode_filter(s) {
            let _ = docgate::FilterSchema::new().validate(&doc);
        }
    }
});
