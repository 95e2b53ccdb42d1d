//! Fiscal field extraction for NF-e documents.

use rust_decimal::Decimal;
use tracing::trace;

use crate::lookup::{FieldLookup, FieldPath};
use crate::models::document::ExtractedRecord;

use super::RecordExtractor;
use super::rules::{amount_or_zero, parse_integer, parse_series};

/// Wrapper-rooted invoice-number paths. A document resolving none of these is
/// not a recognized invoice layout.
pub const STRUCTURE_PATHS: &[FieldPath<'static>] = &[
    &["nfeProc", "NFe", "infNFe", "ide", "nNF"],
    &["NFe", "infNFe", "ide", "nNF"],
    &["infNFe", "ide", "nNF"],
];

pub const NUMBER_PATHS: &[FieldPath<'static>] = &[
    &["nfeProc", "NFe", "infNFe", "ide", "nNF"],
    &["NFe", "infNFe", "ide", "nNF"],
    &["infNFe", "ide", "nNF"],
    &["ide", "nNF"],
    &["nNF"],
];

pub const SERIES_PATHS: &[FieldPath<'static>] = &[
    &["nfeProc", "NFe", "infNFe", "ide", "serie"],
    &["NFe", "infNFe", "ide", "serie"],
    &["infNFe", "ide", "serie"],
    &["ide", "serie"],
    &["serie"],
];

pub const ISSUER_NAME_PATHS: &[FieldPath<'static>] = &[
    &["nfeProc", "NFe", "infNFe", "emit", "xNome"],
    &["NFe", "infNFe", "emit", "xNome"],
    &["infNFe", "emit", "xNome"],
    &["emit", "xNome"],
];

pub const NET_VALUE_PATHS: &[FieldPath<'static>] = &[
    &["infNFe", "total", "ICMSTot", "vNF"],
    &["total", "ICMSTot", "vNF"],
    &["ICMSTot", "vNF"],
    &["vNF"],
];

/// Every installment amount, anywhere in the document.
pub const PAYMENT_AMOUNT: FieldPath<'static> = &["vPag"];

/// Single payment node, consulted when the installment sum is zero.
pub const PAYMENT_NODE_PATHS: &[FieldPath<'static>] = &[
    &["infNFe", "pag", "vPag"],
    &["pag", "vPag"],
    &["detPag", "vPag"],
];

/// Extractor for the NF-e layout (`nfeProc` / `NFe` / `infNFe`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NfeExtractor;

impl NfeExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_paid_value(&self, lookup: &dyn FieldLookup) -> Decimal {
        let installments = lookup.all(PAYMENT_AMOUNT);
        let sum: Decimal = installments.iter().map(|text| amount_or_zero(text)).sum();
        if !sum.is_zero() {
            trace!("Summed {} payment installments", installments.len());
            return sum;
        }

        lookup
            .first_of(PAYMENT_NODE_PATHS)
            .map(|text| amount_or_zero(&text))
            .unwrap_or(Decimal::ZERO)
    }
}

impl RecordExtractor for NfeExtractor {
    fn recognizes(&self, lookup: &dyn FieldLookup) -> bool {
        lookup.first_of(STRUCTURE_PATHS).is_some()
    }

    fn extract(&self, lookup: &dyn FieldLookup) -> ExtractedRecord {
        let number = lookup
            .first_of(NUMBER_PATHS)
            .and_then(|text| parse_integer(&text));

        let series = lookup
            .first_of(SERIES_PATHS)
            .map(|text| parse_series(&text));

        let issuer_name = lookup.first_of(ISSUER_NAME_PATHS).unwrap_or_default();

        let net_value = lookup
            .first_of(NET_VALUE_PATHS)
            .map(|text| amount_or_zero(&text))
            .unwrap_or(Decimal::ZERO);

        let paid_value = self.extract_paid_value(lookup);

        ExtractedRecord {
            number,
            series,
            net_value,
            paid_value,
            issuer_name,
        }
    }
}
