#![no_main]

use irguard_contract::normalize_syntax;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let normalized = normalize_syntax(&raw);
    if normalized.altered {
        assert_ne!(normalized.text, raw);
    } else {
        assert_eq!(normalized.text, raw);
    }
});
