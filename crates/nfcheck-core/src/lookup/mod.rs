//! Field lookup over one document.
//!
//! A path is a list of element names read as a descendant chain: `["ide", "nNF"]`
//! matches any `nNF` element that has an `ide` ancestor. Two strategies implement
//! the same [`FieldLookup`] interface:
//! - [`XmlTree`]: a real XML parse, used whenever the document is well-formed.
//! - [`TextScan`]: marker scanning over the raw text, for documents a parser rejects.

mod scan;
mod tree;

pub use scan::TextScan;
pub use tree::XmlTree;

use tracing::debug;

use crate::error::DocumentError;
use crate::models::config::LookupStrategy;

/// A descendant chain of element names.
pub type FieldPath<'a> = &'a [&'a str];

/// Trait for document field lookups.
pub trait FieldLookup {
    /// Trimmed text content of the first matching element, `None` when absent or empty.
    fn first(&self, path: FieldPath<'_>) -> Option<String>;

    /// Trimmed text content of every matching element, in document order.
    fn all(&self, path: FieldPath<'_>) -> Vec<String>;

    /// Try each path in order; the first one yielding non-empty text wins.
    fn first_of(&self, variants: &[FieldPath<'_>]) -> Option<String> {
        variants.iter().find_map(|path| self.first(path))
    }

    /// Name of the strategy, for diagnostics.
    fn strategy_name(&self) -> &'static str;
}

/// Open a document with the configured strategy.
pub fn open<'a>(
    text: &'a str,
    strategy: LookupStrategy,
) -> Result<Box<dyn FieldLookup + 'a>, DocumentError> {
    match strategy {
        LookupStrategy::Structured => Ok(Box::new(XmlTree::parse(text)?)),
        LookupStrategy::TextScan => Ok(Box::new(TextScan::new(text))),
        LookupStrategy::Auto => match XmlTree::parse(text) {
            Ok(tree) => Ok(Box::new(tree)),
            Err(e) => {
                debug!("Structured parse failed ({}), scanning text instead", e);
                Ok(Box::new(TextScan::new(text)))
            }
        },
    }
}
