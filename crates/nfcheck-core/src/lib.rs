//! Core library for NF-e batch reconciliation.
//!
//! This crate provides:
//! - Field lookup over fiscal XML (structured parse with a text-scanning fallback)
//! - NF-e field extraction and authorization-protocol classification
//! - Duplicate detection, declared/paid divergence checks and number-gap analysis
//! - The batch engine and its progress/completed/failed message protocol

pub mod error;
pub mod invoice;
pub mod lookup;
pub mod models;
pub mod reconcile;

pub use error::{DocumentError, NfcheckError, RequestError, Result};
pub use invoice::{NfeExtractor, RecordExtractor};
pub use lookup::{FieldLookup, TextScan, XmlTree};
pub use models::config::{LookupStrategy, NfcheckConfig, ReconcileConfig};
pub use models::document::{Document, ExtractedRecord, ProtocolInfo, Series};
pub use models::message::{BatchRequest, EngineMessage, ProgressEvent, RejectedEntry};
pub use models::report::Report;
pub use reconcile::{DocumentOutcome, NoProgress, ProgressSink, ReconcileEngine};
