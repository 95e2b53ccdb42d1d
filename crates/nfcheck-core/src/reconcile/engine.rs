//! The batch loop and its message protocol.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{DocumentError, NfcheckError};
use crate::invoice::{NfeExtractor, RecordExtractor, classify_protocol};
use crate::lookup;
use crate::models::config::ReconcileConfig;
use crate::models::document::{Document, ExtractedRecord, ProtocolInfo};
use crate::models::message::{BatchRequest, EngineMessage, ProgressEvent, RejectedEntry};
use crate::models::report::Report;

use super::aggregator::Aggregator;
use super::progress::{ProgressReporter, ProgressSink};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Fields extracted and protocol classified.
    Recognized {
        record: ExtractedRecord,
        protocol: ProtocolInfo,
    },
    /// No invoice-number path resolved; the document is skipped.
    Unrecognized,
    /// The document could not be read.
    Failed(DocumentError),
}

/// Reconciles batches of fiscal documents.
///
/// An engine holds no per-batch state; every call to [`ReconcileEngine::run`]
/// builds and owns its own aggregation state.
pub struct ReconcileEngine {
    config: ReconcileConfig,
    extractor: Box<dyn RecordExtractor>,
}

impl ReconcileEngine {
    /// Create an engine for the NF-e layout.
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            extractor: Box::new(NfeExtractor::new()),
        }
    }

    /// Extract and classify one document.
    pub fn process_document(&self, document: &Document) -> DocumentOutcome {
        if let Some(limit) = self.config.max_document_bytes {
            let size = document.raw_text.len();
            if size > limit {
                return DocumentOutcome::Failed(DocumentError::TooLarge { size, limit });
            }
        }

        let lookup = match lookup::open(&document.raw_text, self.config.lookup) {
            Ok(lookup) => lookup,
            Err(e) => return DocumentOutcome::Failed(e),
        };

        if !self.extractor.recognizes(lookup.as_ref()) {
            return DocumentOutcome::Unrecognized;
        }

        let record = self.extractor.extract(lookup.as_ref());
        let protocol = classify_protocol(&document.raw_text, lookup.as_ref());
        debug!(
            file = %document.filename,
            strategy = lookup.strategy_name(),
            number = ?record.number,
            "Extracted record"
        );

        DocumentOutcome::Recognized { record, protocol }
    }

    /// Process a batch in input order and build the report.
    pub fn run(&self, documents: &[Document], progress: &mut dyn ProgressSink) -> Report {
        self.run_entries(
            documents.iter().map(Ok::<_, &RejectedEntry>),
            documents.len(),
            progress,
        )
    }

    /// Process a decoded request. Rejected entries count as processed and
    /// are filed as per-document errors.
    pub fn run_request(&self, request: &BatchRequest, progress: &mut dyn ProgressSink) -> Report {
        self.run_entries(request.entries.iter().map(Result::as_ref), request.len(), progress)
    }

    fn run_entries<'d, I>(&self, entries: I, total: usize, progress: &mut dyn ProgressSink) -> Report
    where
        I: Iterator<Item = Result<&'d Document, &'d RejectedEntry>>,
    {
        let start = Instant::now();
        let mut aggregator = Aggregator::new(self.config.tolerance);
        let mut reporter = ProgressReporter::new(total, self.config.progress_interval);

        info!("Reconciling {} documents", total);
        aggregator
            .log_mut()
            .info(format!("Received {} documents", total));

        for (index, entry) in entries.enumerate() {
            match entry {
                Ok(document) => self.record(&mut aggregator, document),
                Err(rejected) => {
                    warn!(entry = %rejected.label, error = %rejected.error, "Entry rejected");
                    aggregator.record_failure(&rejected.label, &rejected.error.to_string());
                }
            }

            reporter.report(index + 1, progress);
        }

        let report = aggregator.finish();
        info!(
            "Reconciled {} documents in {}ms",
            report.total_processed,
            start.elapsed().as_millis()
        );
        report
    }

    fn record(&self, aggregator: &mut Aggregator, document: &Document) {
        match self.process_document(document) {
            DocumentOutcome::Recognized { record, protocol } => {
                aggregator.record_document(&document.filename, &record, &protocol);
            }
            DocumentOutcome::Unrecognized => {
                debug!(file = %document.filename, "Unrecognized structure");
                aggregator.record_unrecognized(&document.filename);
            }
            DocumentOutcome::Failed(e) => {
                warn!(file = %document.filename, error = %e, "Document failed");
                aggregator.record_failure(&document.filename, &e.to_string());
            }
        }
    }

    /// Handle one inbound message, emitting progress messages and exactly one
    /// terminal message to `sink`.
    pub fn dispatch<S>(&self, request: &serde_json::Value, mut sink: S)
    where
        S: FnMut(EngineMessage),
    {
        let request = match BatchRequest::from_value(request) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected batch request: {}", e);
                sink(EngineMessage::Failed {
                    message: NfcheckError::from(e).to_string(),
                });
                return;
            }
        };

        self.dispatch_request(&request, sink);
    }

    /// Run an already decoded request, emitting progress messages and the
    /// `Completed` message to `sink`.
    pub fn dispatch_request<S>(&self, request: &BatchRequest, mut sink: S)
    where
        S: FnMut(EngineMessage),
    {
        let report = {
            let mut forward = |event: ProgressEvent| sink(EngineMessage::Progress(event));
            self.run_request(request, &mut forward)
        };
        sink(EngineMessage::Completed {
            report: Box::new(report),
        });
    }
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}
