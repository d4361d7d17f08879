//! Document contract for machine-generated test specifications.
//!
//! Hosts the IR document model, the sentinel value codec, the pre-parse syntax
//! normalizer, the predicate registry, and the structural schema validator.
//! Nothing in this crate executes target code.

pub mod error;
pub mod predicate_registry;
pub mod schema_validator;
pub mod spec_document;
pub mod syntax_normalizer;
pub mod value_codec;

pub use error::{ContractError, ParseError, SchemaError};
pub use predicate_registry::{lookup_predicate, supported_predicate_names, PredicateName};
pub use schema_validator::{
    parse_spec_document, parse_spec_document_with_schema, validate_against_json_schema,
    validate_spec_document,
};
pub use spec_document::{
    split_target_reference, CallSpec, Expectation, SpecCase, SpecDocument,
    DEFAULT_EQUALS_TOLERANCE, TARGET_DELIMITER,
};
pub use syntax_normalizer::{normalize_syntax, parse_normalized_json, NormalizedText};
pub use value_codec::{
    decode_value, encode_value, observed_json, values_equivalent, CodecError, Value,
    SENTINEL_NAN, SENTINEL_NEG_INFINITY, SENTINEL_POS_INFINITY,
};
