//! Duplicate invoice detection across a batch.
//!
//! Two disjoint pools are kept. Documents with a known series are keyed by
//! `series-number`; documents without one fall back to the number alone and
//! their groups are flagged as degraded. Two distinct invoices whose series
//! could not be read will therefore collide in the fallback pool.

use std::collections::HashMap;

use crate::models::document::{ExtractedRecord, Series};
use crate::models::report::{DuplicateGroup, DuplicateKind, DuplicateStats, ReconcileLog};

/// Series reported for groups in the fallback pool.
pub const UNKNOWN_SERIES: &str = "unknown";

/// First sighting of a key.
#[derive(Debug, Clone)]
struct FirstSeen {
    filename: String,
    issuer_name: String,
}

/// One key space: first sightings plus the groups realized on repeat.
#[derive(Debug, Default)]
struct Pool {
    seen: HashMap<String, FirstSeen>,
    group_index: HashMap<String, usize>,
    groups: Vec<DuplicateGroup>,
}

impl Pool {
    /// Record a sighting. Returns the group when the key was already seen.
    fn observe(
        &mut self,
        key: String,
        filename: &str,
        issuer_name: &str,
        new_group: impl FnOnce(&FirstSeen) -> DuplicateGroup,
    ) -> Option<&DuplicateGroup> {
        let Some(first) = self.seen.get(&key) else {
            self.seen.insert(
                key,
                FirstSeen {
                    filename: filename.to_string(),
                    issuer_name: issuer_name.to_string(),
                },
            );
            return None;
        };

        let index = match self.group_index.get(&key) {
            Some(&index) => index,
            None => {
                let group = new_group(first);
                self.groups.push(group);
                self.group_index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[index];
        if !group.filenames.iter().any(|f| f == filename) {
            group.filenames.push(filename.to_string());
        }
        Some(group)
    }
}

/// Running duplicate state for one batch.
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    composite: Pool,
    fallback: Pool,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one document's record. Repeats append a warning to `log`.
    pub fn observe(&mut self, filename: &str, record: &ExtractedRecord, log: &mut ReconcileLog) {
        let Some(number) = record.number else {
            return;
        };

        match record.series.as_ref().filter(|series| series.is_known()) {
            Some(series) => {
                let key = format!("{}-{}", series, number);
                let group = self.composite.observe(
                    key.clone(),
                    filename,
                    &record.issuer_name,
                    |first| DuplicateGroup {
                        key: key.clone(),
                        number,
                        series: series.clone(),
                        issuer_name: if first.issuer_name.is_empty() {
                            record.issuer_name.clone()
                        } else {
                            first.issuer_name.clone()
                        },
                        filenames: vec![first.filename.clone()],
                        degraded: false,
                        kind: DuplicateKind::Normal,
                    },
                );
                if let Some(group) = group {
                    log.warn(format!(
                        "Series {} - invoice {} duplicated in files: {} (issuer: {})",
                        series,
                        number,
                        group.filenames.join(", "),
                        display_issuer(&record.issuer_name),
                    ));
                }
            }
            None => {
                let group = self.fallback.observe(
                    number.to_string(),
                    filename,
                    &record.issuer_name,
                    |first| DuplicateGroup {
                        key: format!("fallback-{}", number),
                        number,
                        series: Series::Text(UNKNOWN_SERIES.to_string()),
                        issuer_name: if first.issuer_name.is_empty() {
                            record.issuer_name.clone()
                        } else {
                            first.issuer_name.clone()
                        },
                        filenames: vec![first.filename.clone()],
                        degraded: true,
                        kind: DuplicateKind::Fallback,
                    },
                );
                if let Some(group) = group {
                    log.warn(format!(
                        "Invoice {} (no series) duplicated in files: {} (issuer: {})",
                        number,
                        group.filenames.join(", "),
                        display_issuer(&record.issuer_name),
                    ));
                }
            }
        }
    }

    /// Groups keyed by series and number, in order of first repeat.
    pub fn composite_groups(&self) -> &[DuplicateGroup] {
        &self.composite.groups
    }

    /// Groups keyed by number alone, in order of first repeat.
    pub fn fallback_groups(&self) -> &[DuplicateGroup] {
        &self.fallback.groups
    }

    pub fn stats(&self) -> DuplicateStats {
        DuplicateStats {
            total: self.composite.groups.len() + self.fallback.groups.len(),
            with_series: self.composite.groups.len(),
            without_series: self.fallback.groups.len(),
        }
    }

    /// All realized groups, series-keyed first.
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        let mut groups = self.composite.groups;
        groups.extend(self.fallback.groups);
        groups
    }
}

fn display_issuer(name: &str) -> &str {
    if name.is_empty() { "N/A" } else { name }
}
