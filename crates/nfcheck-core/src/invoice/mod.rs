//! Per-document fiscal field extraction and protocol classification.

mod extractor;
pub mod protocol;
pub mod rules;

pub use extractor::{
    ISSUER_NAME_PATHS, NET_VALUE_PATHS, NUMBER_PATHS, NfeExtractor, PAYMENT_AMOUNT,
    PAYMENT_NODE_PATHS, SERIES_PATHS, STRUCTURE_PATHS,
};
pub use protocol::{classify_protocol, has_protocol_block};

use crate::lookup::FieldLookup;
use crate::models::document::ExtractedRecord;

/// Trait for fiscal record extractors.
pub trait RecordExtractor: Send + Sync {
    /// Whether the document matches a layout this extractor understands.
    fn recognizes(&self, lookup: &dyn FieldLookup) -> bool;

    /// Extract fields. Missing or unparsable fields degrade to defaults.
    fn extract(&self, lookup: &dyn FieldLookup) -> ExtractedRecord;
}
