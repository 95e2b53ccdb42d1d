//! Authorization-protocol classification.

use crate::lookup::{FieldLookup, FieldPath};
use crate::models::document::ProtocolInfo;

use super::rules::PROTOCOL_MARKER;

pub const STATUS_CODE_PATHS: &[FieldPath<'static>] = &[
    &["protNFe", "infProt", "cStat"],
    &["protNFe", "cStat"],
    &["cStat"],
];

pub const PROTOCOL_NUMBER_PATHS: &[FieldPath<'static>] = &[
    &["protNFe", "infProt", "nProt"],
    &["protNFe", "nProt"],
    &["nProt"],
];

pub const REASON_TEXT_PATHS: &[FieldPath<'static>] = &[
    &["protNFe", "infProt", "xMotivo"],
    &["protNFe", "xMotivo"],
    &["xMotivo"],
];

pub const RECEIVED_AT_PATHS: &[FieldPath<'static>] = &[
    &["protNFe", "infProt", "dhRecbto"],
    &["protNFe", "dhRecbto"],
    &["dhRecbto"],
];

/// Whether the raw text carries an authorization-protocol block.
pub fn has_protocol_block(raw_text: &str) -> bool {
    PROTOCOL_MARKER.is_match(raw_text)
}

/// Classify the protocol of one document.
///
/// Sub-fields are looked up independently; the protocol is complete when both
/// the status code and the protocol number are present.
pub fn classify_protocol(raw_text: &str, lookup: &dyn FieldLookup) -> ProtocolInfo {
    if !has_protocol_block(raw_text) {
        return ProtocolInfo::default();
    }

    let status_code = lookup.first_of(STATUS_CODE_PATHS);
    let protocol_number = lookup.first_of(PROTOCOL_NUMBER_PATHS);
    let reason_text = lookup.first_of(REASON_TEXT_PATHS);
    let received_at = lookup.first_of(RECEIVED_AT_PATHS);

    ProtocolInfo {
        present: true,
        complete: status_code.is_some() && protocol_number.is_some(),
        status_code,
        protocol_number,
        reason_text,
        received_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::XmlTree;
    use crate::models::document::ProtocolState;
    use pretty_assertions::assert_eq;

    fn classify(xml: &str) -> ProtocolInfo {
        let tree = XmlTree::parse(xml).unwrap();
        classify_protocol(xml, &tree)
    }

    #[test]
    fn test_missing_block() {
        let info = classify("<nfeProc><NFe/></nfeProc>");
        assert_eq!(info, ProtocolInfo::default());
        assert_eq!(info.state(), ProtocolState::Missing);
    }

    #[test]
    fn test_complete_block() {
        let info = classify(
            "<nfeProc><protNFe versao=\"4.00\"><infProt><cStat>100</cStat>\
             <nProt>135240000000001</nProt><xMotivo>Autorizado o uso da NF-e</xMotivo>\
             <dhRecbto>2024-01-15T10:00:00-03:00</dhRecbto></infProt></protNFe></nfeProc>",
        );
        assert_eq!(info.state(), ProtocolState::Complete);
        assert_eq!(info.status_code.as_deref(), Some("100"));
        assert_eq!(info.protocol_number.as_deref(), Some("135240000000001"));
        assert_eq!(info.reason_text.as_deref(), Some("Autorizado o uso da NF-e"));
    }

    #[test]
    fn test_missing_protocol_number_is_incomplete() {
        let info = classify(
            "<nfeProc><protNFe><infProt><xMotivo>Em processamento</xMotivo>\
             <dhRecbto>2024-01-15T10:00:00-03:00</dhRecbto></infProt></protNFe></nfeProc>",
        );
        assert_eq!(
            info,
            ProtocolInfo {
                present: true,
                complete: false,
                status_code: None,
                protocol_number: None,
                reason_text: Some("Em processamento".to_string()),
                received_at: Some("2024-01-15T10:00:00-03:00".to_string()),
            }
        );
        assert_eq!(info.state(), ProtocolState::Incomplete);
    }

    #[test]
    fn test_status_without_number_is_incomplete() {
        let info = classify("<protNFe><infProt><cStat>100</cStat></infProt></protNFe>");
        assert!(info.present);
        assert!(!info.complete);
    }

    #[test]
    fn test_marker_accepts_prefix_and_attributes() {
        assert!(has_protocol_block("<protNFe>"));
        assert!(has_protocol_block("<protNFe versao=\"4.00\">"));
        assert!(has_protocol_block("<nfe:protNFe>"));
        assert!(!has_protocol_block("<protNFeX>"));
        assert!(!has_protocol_block("protNFe"));
    }
}
