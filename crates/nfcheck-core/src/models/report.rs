//! Reconciliation report and its parts.
//!
//! Field names serialize in camelCase, matching what report renderers consume.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::document::Series;

/// The final, immutable outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Every document attempted, recognized or not.
    pub total_processed: usize,

    #[serde(with = "rust_decimal::serde::float")]
    pub sum_net: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub sum_paid: Decimal,

    /// `sum_net - sum_paid`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_difference: Decimal,

    pub divergences: Vec<DivergenceRecord>,

    /// Realized duplicate groups, series-keyed ones first.
    pub duplicates: Vec<DuplicateGroup>,

    pub duplicate_stats: DuplicateStats,

    /// Flat ascending list of numbers absent from the observed range.
    pub missing_numbers: Vec<i64>,

    /// `missing_numbers` compressed into `start` / `start-end` tokens.
    pub missing_ranges: Vec<String>,

    pub protocol_status: ProtocolStatus,

    pub documents_missing_protocol: Vec<MissingProtocolEntry>,

    pub documents_incomplete_protocol: Vec<IncompleteProtocolEntry>,

    /// First non-empty issuer name in document order.
    pub issuer_name: Option<String>,

    /// Share of documents with a complete protocol, one decimal place.
    pub percent_with_protocol: f64,

    /// No document lacks the protocol block entirely.
    pub all_have_protocol: bool,

    pub range_metadata: RangeMetadata,

    pub log: ReconcileLog,
}

impl Report {
    /// The batch completed but some documents failed.
    pub fn is_degraded(&self) -> bool {
        !self.log.errors.is_empty()
    }
}

/// Which way a monetary mismatch points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivergenceStatus {
    NetGreater,
    PaidGreater,
}

/// A document whose declared and paid values disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergenceRecord {
    pub number: Option<i64>,
    pub filename: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_value: Decimal,
    /// `net_value - paid_value`.
    #[serde(with = "rust_decimal::serde::float")]
    pub difference: Decimal,
    pub status: DivergenceStatus,
    pub protocol_present: bool,
}

/// Pool a duplicate group was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    /// Keyed by series and number.
    Normal,
    /// Keyed by number alone, series unknown.
    Fallback,
}

/// A set of files sharing one invoice identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub key: String,
    pub number: i64,
    pub series: Series,
    pub issuer_name: String,
    /// First-seen file followed by every later file, each at most once.
    pub filenames: Vec<String>,
    pub degraded: bool,
    #[serde(rename = "type")]
    pub kind: DuplicateKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateStats {
    pub total: usize,
    pub with_series: usize,
    pub without_series: usize,
}

/// Missing invoice numbers over the observed range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub missing: Vec<i64>,
    pub min_number: i64,
    pub max_number: i64,
    pub range_size: u64,
    pub found_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeMetadata {
    pub min: i64,
    pub max: i64,
    pub range_size: u64,
    pub found_count: usize,
}

impl From<&GapReport> for RangeMetadata {
    fn from(gaps: &GapReport) -> Self {
        Self {
            min: gaps.min_number,
            max: gaps.max_number,
            range_size: gaps.range_size,
            found_count: gaps.found_count,
        }
    }
}

/// Protocol tallies over recognized documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolStatus {
    pub total: usize,
    pub with_protocol: usize,
    pub incomplete: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingProtocolEntry {
    pub number: Option<i64>,
    pub filename: String,
    pub reason: String,
}

/// Raw protocol sub-fields as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetails {
    pub status_code: Option<String>,
    pub protocol_number: Option<String>,
    pub reason_text: Option<String>,
    pub received_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteProtocolEntry {
    pub number: Option<i64>,
    pub filename: String,
    pub reason: String,
    pub details: ProtocolDetails,
}

/// User-facing log accumulated over one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileLog {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ReconcileLog {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }
}
