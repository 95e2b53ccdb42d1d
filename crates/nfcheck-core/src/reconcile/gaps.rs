//! Missing invoice numbers within the observed range.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::report::GapReport;

/// Every integer in `[min, max]` of `numbers` that is not in `numbers`.
///
/// An empty set yields an all-zero report.
pub fn find_gaps(numbers: &BTreeSet<i64>) -> GapReport {
    let (Some(&min_number), Some(&max_number)) = (numbers.first(), numbers.last()) else {
        return GapReport::default();
    };

    let mut missing = Vec::new();
    let mut expected = min_number;
    for &n in numbers {
        missing.extend(expected..n);
        expected = n.saturating_add(1);
    }

    let range_size = max_number.abs_diff(min_number) + 1;
    debug!(
        "Number range {}-{}: {} in range, {} found, {} missing",
        min_number,
        max_number,
        range_size,
        numbers.len(),
        missing.len()
    );

    GapReport {
        missing,
        min_number,
        max_number,
        range_size,
        found_count: numbers.len(),
    }
}

/// Compress an ascending list into `start` or `start-end` tokens for contiguous runs.
pub fn compress_ranges(numbers: &[i64]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut iter = numbers.iter().copied();
    let Some(mut start) = iter.next() else {
        return tokens;
    };
    let mut end = start;

    for n in iter {
        if end.checked_add(1) == Some(n) {
            end = n;
            continue;
        }
        tokens.push(range_token(start, end));
        start = n;
        end = n;
    }
    tokens.push(range_token(start, end));
    tokens
}

fn range_token(start: i64, end: i64) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}
