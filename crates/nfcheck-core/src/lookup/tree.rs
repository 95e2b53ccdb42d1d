//! Structured lookup backed by a flat element tree.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::DocumentError;

use super::{FieldLookup, FieldPath};

/// One element. Its text content is `text[text_start..text_end]` of the owning tree,
/// since all character data is appended to one buffer in document order.
#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<usize>,
    text_start: usize,
    text_end: usize,
}

/// Parsed document, elements stored in document order.
#[derive(Debug)]
pub struct XmlTree {
    nodes: Vec<Node>,
    text: String,
}

impl XmlTree {
    /// Parse a document. Element names are reduced to their local part.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut nodes: Vec<Node> = Vec::new();
        let mut text = String::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let index = nodes.len();
                    nodes.push(Node {
                        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        parent: open.last().copied(),
                        text_start: text.len(),
                        text_end: text.len(),
                    });
                    open.push(index);
                }
                Ok(Event::Empty(e)) => {
                    nodes.push(Node {
                        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        parent: open.last().copied(),
                        text_start: text.len(),
                        text_end: text.len(),
                    });
                }
                Ok(Event::End(_)) => {
                    if let Some(index) = open.pop() {
                        nodes[index].text_end = text.len();
                    }
                }
                Ok(Event::Text(e)) => {
                    if !open.is_empty() {
                        let unescaped = e.unescape().map_err(|err| {
                            DocumentError::MalformedXml(format!(
                                "at byte {}: {}",
                                reader.buffer_position(),
                                err
                            ))
                        })?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(e)) => {
                    if !open.is_empty() {
                        text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(DocumentError::MalformedXml(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if let Some(&index) = open.last() {
            return Err(DocumentError::MalformedXml(format!(
                "element <{}> is never closed",
                nodes[index].name
            )));
        }

        Ok(Self { nodes, text })
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn content(&self, index: usize) -> &str {
        let node = &self.nodes[index];
        self.text[node.text_start..node.text_end].trim()
    }

    /// Whether element `index` is the last path segment with the preceding
    /// segments found, in order, among its ancestors.
    fn matches(&self, index: usize, path: FieldPath<'_>) -> bool {
        let Some((last, mut ancestors)) = path.split_last() else {
            return false;
        };
        if self.nodes[index].name != *last {
            return false;
        }

        let mut current = self.nodes[index].parent;
        while let Some((wanted, rest)) = ancestors.split_last() {
            loop {
                let Some(parent) = current else {
                    return false;
                };
                current = self.nodes[parent].parent;
                if self.nodes[parent].name == *wanted {
                    break;
                }
            }
            ancestors = rest;
        }
        true
    }
}

impl FieldLookup for XmlTree {
    fn first(&self, path: FieldPath<'_>) -> Option<String> {
        (0..self.nodes.len())
            .find(|&index| self.matches(index, path))
            .map(|index| self.content(index))
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }

    fn all(&self, path: FieldPath<'_>) -> Vec<String> {
        (0..self.nodes.len())
            .filter(|&index| self.matches(index, path))
            .map(|index| self.content(index).to_string())
            .collect()
    }

    fn strategy_name(&self) -> &'static str {
        "xml-tree"
    }
}
