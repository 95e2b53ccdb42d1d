//! Parsing rules shared by the field extractors.

pub mod numbers;
pub mod patterns;

pub use numbers::{amount_or_zero, parse_amount, parse_integer, parse_series};
pub use patterns::*;
