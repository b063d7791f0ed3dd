#![no_main]
use docgate::filter::validate_filter;
use docgate::{Expose, FilterParser, PropertyRegistry, decode_filter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(raw) = decode_filter(s) else { return };
    let Ok(reg) = PropertyRegistry::builder("fuzz")
        .expose("name", Expose::new().filterable())
        .expose("created_at", Expose::new().filterable().date().alias("createdAt"))
        .expose("hidden", Expose::new())
        .build()
    else {
        return;
    };
    // Accepted filters satisfy the grammar and never mention unfilterable fields.
    if let Ok(canonical) = FilterParser::new(&reg).parse(Some(&raw)) {
        assert!(validate_filter(&canonical).is_ok());
        assert!(!canonical.contains_key("hidden"));
    }
});
