//! Folds per-document outcomes into the final report.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::info;

use crate::models::document::{ExtractedRecord, ProtocolInfo, ProtocolState};
use crate::models::report::*;

use super::divergence::detect_divergence;
use super::duplicates::DuplicateTracker;
use super::gaps::{compress_ranges, find_gaps};

pub const REASON_PROTOCOL_NOT_FOUND: &str = "Authorization protocol not found";
pub const REASON_PROTOCOL_INCOMPLETE: &str = "Incomplete protocol";

/// Running state of one batch run.
#[derive(Debug)]
pub struct Aggregator {
    tolerance: Decimal,
    total_processed: usize,
    sum_net: Decimal,
    sum_paid: Decimal,
    numbers: BTreeSet<i64>,
    issuer_name: Option<String>,
    protocol_status: ProtocolStatus,
    missing_protocol: Vec<MissingProtocolEntry>,
    incomplete_protocol: Vec<IncompleteProtocolEntry>,
    divergences: Vec<DivergenceRecord>,
    duplicates: DuplicateTracker,
    log: ReconcileLog,
}

impl Aggregator {
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance,
            total_processed: 0,
            sum_net: Decimal::ZERO,
            sum_paid: Decimal::ZERO,
            numbers: BTreeSet::new(),
            issuer_name: None,
            protocol_status: ProtocolStatus::default(),
            missing_protocol: Vec::new(),
            incomplete_protocol: Vec::new(),
            divergences: Vec::new(),
            duplicates: DuplicateTracker::new(),
            log: ReconcileLog::default(),
        }
    }

    pub fn log_mut(&mut self) -> &mut ReconcileLog {
        &mut self.log
    }

    /// A document whose layout was not recognized.
    pub fn record_unrecognized(&mut self, filename: &str) {
        self.total_processed += 1;
        self.log
            .warn(format!("File {}: XML structure not recognized", filename));
    }

    /// A document that failed with a recoverable error.
    pub fn record_failure(&mut self, filename: &str, reason: &str) {
        self.total_processed += 1;
        self.log.error(format!("File {}: {}", filename, reason));
    }

    /// A recognized document.
    pub fn record_document(
        &mut self,
        filename: &str,
        record: &ExtractedRecord,
        protocol: &ProtocolInfo,
    ) {
        self.total_processed += 1;

        if self.issuer_name.is_none() && !record.issuer_name.is_empty() {
            self.issuer_name = Some(record.issuer_name.clone());
        }

        self.protocol_status.total += 1;
        match protocol.state() {
            ProtocolState::Missing => {
                self.protocol_status.missing += 1;
                self.missing_protocol.push(MissingProtocolEntry {
                    number: record.number,
                    filename: filename.to_string(),
                    reason: REASON_PROTOCOL_NOT_FOUND.to_string(),
                });
            }
            ProtocolState::Incomplete => {
                self.protocol_status.incomplete += 1;
                self.incomplete_protocol.push(IncompleteProtocolEntry {
                    number: record.number,
                    filename: filename.to_string(),
                    reason: REASON_PROTOCOL_INCOMPLETE.to_string(),
                    details: ProtocolDetails {
                        status_code: protocol.status_code.clone(),
                        protocol_number: protocol.protocol_number.clone(),
                        reason_text: protocol.reason_text.clone(),
                        received_at: protocol.received_at.clone(),
                    },
                });
            }
            ProtocolState::Complete => self.protocol_status.with_protocol += 1,
        }

        if let Some(number) = record.number {
            self.numbers.insert(number);
        }

        self.duplicates.observe(filename, record, &mut self.log);

        self.sum_net += record.net_value;
        self.sum_paid += record.paid_value;

        if let Some(divergence) =
            detect_divergence(filename, record, protocol.present, self.tolerance)
        {
            self.divergences.push(divergence);
        }
    }

    /// Run the gap analysis and assemble the report.
    pub fn finish(self) -> Report {
        let Aggregator {
            total_processed,
            sum_net,
            sum_paid,
            numbers,
            issuer_name,
            protocol_status,
            missing_protocol,
            incomplete_protocol,
            divergences,
            duplicates,
            mut log,
            ..
        } = self;

        let gaps = find_gaps(&numbers);
        if gaps.found_count > 0 {
            log.info(format!(
                "Detected number range {}-{}: {} numbers, {} found, {} missing",
                gaps.min_number,
                gaps.max_number,
                gaps.range_size,
                gaps.found_count,
                gaps.missing.len()
            ));
        }

        let duplicate_stats = duplicates.stats();
        if duplicate_stats.total > 0 {
            log.info(format!(
                "Duplicates: {} ({} with series, {} without series)",
                duplicate_stats.total, duplicate_stats.with_series, duplicate_stats.without_series
            ));
        }

        info!(
            processed = total_processed,
            divergences = divergences.len(),
            duplicates = duplicate_stats.total,
            missing = gaps.missing.len(),
            "Reconciliation finished"
        );

        Report {
            total_processed,
            sum_net,
            sum_paid,
            total_difference: sum_net - sum_paid,
            divergences,
            duplicates: duplicates.into_groups(),
            duplicate_stats,
            missing_ranges: compress_ranges(&gaps.missing),
            range_metadata: RangeMetadata::from(&gaps),
            missing_numbers: gaps.missing,
            percent_with_protocol: percent_of(protocol_status.with_protocol, protocol_status.total),
            all_have_protocol: protocol_status.missing == 0,
            protocol_status,
            documents_missing_protocol: missing_protocol,
            documents_incomplete_protocol: incomplete_protocol,
            issuer_name,
            log,
        }
    }
}

/// `part / total * 100` rounded to one decimal place, `0.0` for an empty total.
fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}
