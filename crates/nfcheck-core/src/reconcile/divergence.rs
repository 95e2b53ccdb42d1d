//! Declared vs. paid value check.

use rust_decimal::Decimal;

use crate::models::document::ExtractedRecord;
use crate::models::report::{DivergenceRecord, DivergenceStatus};

/// Whether two amounts are equal within `tolerance` (inclusive).
pub fn amounts_match(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}

/// A divergence record when declared and paid values differ by more than `tolerance`.
pub fn detect_divergence(
    filename: &str,
    record: &ExtractedRecord,
    protocol_present: bool,
    tolerance: Decimal,
) -> Option<DivergenceRecord> {
    if amounts_match(record.net_value, record.paid_value, tolerance) {
        return None;
    }

    let status = if record.net_value > record.paid_value {
        DivergenceStatus::NetGreater
    } else {
        DivergenceStatus::PaidGreater
    };

    Some(DivergenceRecord {
        number: record.number,
        filename: filename.to_string(),
        net_value: record.net_value,
        paid_value: record.paid_value,
        difference: record.net_value - record.paid_value,
        status,
        protocol_present,
    })
}
