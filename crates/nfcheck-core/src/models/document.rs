//! Per-document data: the input unit and what is extracted from it.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One uploaded fiscal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File name as uploaded.
    #[serde(rename = "name")]
    pub filename: String,

    /// Raw textual contents.
    #[serde(rename = "content")]
    pub raw_text: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// Invoice series: numeric when the text parses as an integer, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Number(i64),
    Text(String),
}

impl Series {
    /// Whether the series identifies a partition of the numbering sequence.
    ///
    /// A numeric series of zero is treated as unknown, so documents carrying it
    /// are grouped in the number-only pool.
    pub fn is_known(&self) -> bool {
        match self {
            Series::Number(n) => *n != 0,
            Series::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::Number(n) => write!(f, "{}", n),
            Series::Text(s) => f.write_str(s),
        }
    }
}

/// Fiscal fields pulled out of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// Invoice number, absent when no number field parsed as an integer.
    pub number: Option<i64>,

    /// Invoice series.
    pub series: Option<Series>,

    /// Declared total value.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_value: Decimal,

    /// Sum of every paid amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_value: Decimal,

    /// Issuer legal name, empty when absent.
    pub issuer_name: String,
}

impl Default for ExtractedRecord {
    fn default() -> Self {
        Self {
            number: None,
            series: None,
            net_value: Decimal::ZERO,
            paid_value: Decimal::ZERO,
            issuer_name: String::new(),
        }
    }
}

/// Authorization-protocol status of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolInfo {
    /// The protocol block is present.
    pub present: bool,
    /// Both status code and protocol number were found.
    pub complete: bool,
    pub status_code: Option<String>,
    pub protocol_number: Option<String>,
    pub reason_text: Option<String>,
    pub received_at: Option<String>,
}

/// Three-way protocol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    Missing,
    Incomplete,
    Complete,
}

impl ProtocolInfo {
    pub fn state(&self) -> ProtocolState {
        match (self.present, self.complete) {
            (false, _) => ProtocolState::Missing,
            (true, false) => ProtocolState::Incomplete,
            (true, true) => ProtocolState::Complete,
        }
    }
}
