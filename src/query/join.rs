// src/query/join.rs

use arrow::array::{Array, StringArray};
use std::collections::HashMap;

/// Inner equi-join of two row sets on one or more text key columns.
///
/// `left_keys[k]` is compared with `right_keys[k]` by exact string equality.
/// Returns `(left_row, right_row)` pairs ordered by left row, then by right
/// row, which makes the output deterministic for a given input order.
pub fn inner_join_indices(
    left_keys: &[&StringArray],
    right_keys: &[&StringArray],
) -> Vec<(usize, usize)> {
    debug_assert_eq!(left_keys.len(), right_keys.len());
    let (Some(left_first), Some(right_first)) = (left_keys.first(), right_keys.first()) else {
        return Vec::new();
    };

    // build on the right side
    let mut table: HashMap<Vec<&str>, Vec<usize>> = HashMap::with_capacity(right_first.len());
    for row in 0..right_first.len() {
        let key: Vec<&str> = right_keys.iter().map(|col| col.value(row)).collect();
        table.entry(key).or_default().push(row);
    }

    // probe with the left side, in order
    let mut pairs = Vec::new();
    let mut probe: Vec<&str> = Vec::with_capacity(left_keys.len());
    for row in 0..left_first.len() {
        probe.clear();
        probe.extend(left_keys.iter().map(|col| col.value(row)));
        if let Some(matches) = table.get(&probe) {
            pairs.extend(matches.iter().map(|&r| (row, r)));
        }
    }
    pairs
}
