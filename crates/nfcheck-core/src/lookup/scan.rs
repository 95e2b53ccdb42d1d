//! Text-pattern lookup for documents the XML parser rejects.

use std::collections::HashMap;
use std::sync::Mutex;

use lazy_static::lazy_static;
use regex::Regex;

use super::{FieldLookup, FieldPath};

lazy_static! {
    // Compiled tag patterns, keyed by kind and tag name.
    static ref TAG_PATTERNS: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

fn cached(key: String, pattern: impl FnOnce() -> String) -> Regex {
    let mut cache = TAG_PATTERNS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(key)
        .or_insert_with(|| {
            Regex::new(&pattern()).expect("escaped tag always forms a valid pattern")
        })
        .clone()
}

/// Pattern for `<tag ...>content</tag>`, non-greedy, exact tag name.
fn element_pattern(tag: &str) -> Regex {
    cached(format!("element:{}", tag), || {
        let tag = regex::escape(tag);
        format!(r"(?s)<{tag}(?:\s+[^>]*[^/])?\s*>(.*?)</{tag}\s*>")
    })
}

/// Pattern for an opening `<tag ...>` alone.
fn open_tag_pattern(tag: &str) -> Regex {
    cached(format!("open:{}", tag), || {
        let tag = regex::escape(tag);
        format!(r"<{tag}(?:\s+[^>]*[^/])?\s*>")
    })
}

fn decode(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

/// Lookup over raw text: each ancestor segment narrows the search to the
/// first matching element's inner text, the last segment selects elements.
#[derive(Debug, Clone, Copy)]
pub struct TextScan<'a> {
    text: &'a str,
}

impl<'a> TextScan<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Text inside the first element chain matching `ancestors`.
    ///
    /// An ancestor that is opened but never closed (a truncated document)
    /// scopes to the end of the text.
    fn scope(&self, ancestors: &[&str]) -> Option<&'a str> {
        ancestors.iter().try_fold(self.text, |scope, tag| {
            element_pattern(tag)
                .captures(scope)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .or_else(|| {
                    open_tag_pattern(tag)
                        .find(scope)
                        .map(|m| &scope[m.end()..])
                })
        })
    }
}

impl FieldLookup for TextScan<'_> {
    fn first(&self, path: FieldPath<'_>) -> Option<String> {
        let (last, ancestors) = path.split_last()?;
        let scope = self.scope(ancestors)?;
        element_pattern(last)
            .captures(scope)
            .and_then(|caps| caps.get(1))
            .map(|m| decode(m.as_str()))
            .filter(|content| !content.is_empty())
    }

    fn all(&self, path: FieldPath<'_>) -> Vec<String> {
        let Some((last, ancestors)) = path.split_last() else {
            return Vec::new();
        };
        let Some(scope) = self.scope(ancestors) else {
            return Vec::new();
        };
        element_pattern(last)
            .captures_iter(scope)
            .filter_map(|caps| caps.get(1))
            .map(|m| decode(m.as_str()))
            .collect()
    }

    fn strategy_name(&self) -> &'static str {
        "text-scan"
    }
}
