#![no_main]

use irguard_contract::{parse_spec_document, split_target_reference, ContractError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    match parse_spec_document(&raw) {
        Ok(document) => {
            assert!(split_target_reference(&document.target).is_some());
            let reparsed = parse_spec_document(&document.to_json().to_string())
                .expect("validated document re-parses");
            assert_eq!(reparsed.cases.len(), document.cases.len());
        }
        Err(ContractError::Parse(error)) => assert!(!error.message.is_empty()),
        Err(ContractError::Schema(error)) => assert!(!error.field.is_empty()),
    }
});
