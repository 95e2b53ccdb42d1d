//! Inbound and outbound messages exchanged with an engine host.

use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, RequestError};

use super::document::Document;
use super::report::Report;

/// A `documents` entry that could not be decoded. It is still part of the
/// batch and is reported as a per-document error.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    /// The entry's `name` when it carries one, otherwise its position.
    pub label: String,
    pub error: DocumentError,
}

/// One decoded `documents` entry.
pub type RequestEntry = Result<Document, RejectedEntry>;

/// The single inbound message: a whole batch of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    /// Entries in input order.
    pub entries: Vec<RequestEntry>,
}

impl BatchRequest {
    /// Validate and decode a raw inbound message.
    ///
    /// Only a missing or non-sequence `documents` field rejects the message;
    /// undecodable entries are kept as [`RejectedEntry`] values.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, RequestError> {
        let entries = match value.get("documents") {
            None | Some(serde_json::Value::Null) => return Err(RequestError::MissingDocuments),
            Some(serde_json::Value::Array(entries)) => entries,
            Some(_) => return Err(RequestError::DocumentsNotSequence),
        };

        let entries = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| decode_entry(index, entry))
            .collect();

        Ok(Self { entries })
    }

    /// Decode a raw inbound message from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| RequestError::Json(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn decode_entry(index: usize, entry: &serde_json::Value) -> RequestEntry {
    Document::deserialize(entry).map_err(|e| RejectedEntry {
        label: entry
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("entry {}", index)),
        error: DocumentError::MalformedEntry(e.to_string()),
    })
}

/// Periodic status emitted during the batch loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Whole percent, 0-100.
    pub percent: u8,
    pub processed: usize,
    pub total: usize,
    pub status: String,
}

/// Outbound messages. A run emits zero or more `Progress` messages followed
/// by exactly one terminal `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineMessage {
    Progress(ProgressEvent),
    Completed { report: Box<Report> },
    Failed { message: String },
}

impl EngineMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EngineMessage::Progress(_))
    }
}
