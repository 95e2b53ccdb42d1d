//! Data models for documents, messages, reports and configuration.

pub mod config;
pub mod document;
pub mod message;
pub mod report;

pub use config::{LookupStrategy, NfcheckConfig, ReconcileConfig};
pub use document::{Document, ExtractedRecord, ProtocolInfo, ProtocolState, Series};
pub use message::{BatchRequest, EngineMessage, ProgressEvent, RejectedEntry, RequestEntry};
pub use report::*;
