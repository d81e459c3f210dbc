//! Display ordering and selection.
//!
//! The status bar has room for a handful of POS entries, and a fixed set of
//! well-known integrations must always appear first when present. Everything
//! else keeps its upstream order.

use super::metric::PosMetric;

/// Display names that always sort to the front, in this order.
pub const PRIORITY_POS: &[&str] = &["POS 2", "POS 63", "POS 11"];

/// Maximum number of records handed to presentation.
pub const MAX_DISPLAY: usize = 5;

/// Order records by the priority list and truncate to the display cap.
///
/// Records whose name is on `priority` come first, in list order. All other
/// records follow in their original relative order — the sort key pairs the
/// priority rank with the original index, so ties never reorder.
pub fn prioritize<'a>(pos: &'a [PosMetric], priority: &[&str]) -> Vec<&'a PosMetric> {
    let mut ranked: Vec<(usize, usize, &PosMetric)> = pos
        .iter()
        .enumerate()
        .map(|(index, metric)| {
            let rank = priority
                .iter()
                .position(|name| *name == metric.name)
                .unwrap_or(priority.len());
            (rank, index, metric)
        })
        .collect();

    ranked.sort_by_key(|(rank, index, _)| (*rank, *index));
    ranked
        .into_iter()
        .take(MAX_DISPLAY)
        .map(|(_, _, metric)| metric)
        .collect()
}

/// `prioritize` with the built-in priority list.
pub fn prioritize_default(pos: &[PosMetric]) -> Vec<&PosMetric> {
    prioritize(pos, PRIORITY_POS)
}
