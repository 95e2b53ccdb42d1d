//! Common regex patterns for fiscal field parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Leading decimal number: optional sign, digits with optional fraction, optional exponent
    pub static ref LEADING_DECIMAL: Regex = Regex::new(
        r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?"
    ).unwrap();

    // Leading signed integer
    pub static ref LEADING_INTEGER: Regex = Regex::new(
        r"^[+-]?\d+"
    ).unwrap();

    // Authorization protocol block marker
    pub static ref PROTOCOL_MARKER: Regex = Regex::new(
        r"<(?:[A-Za-z_][\w.-]*:)?protNFe\b"
    ).unwrap();
}
