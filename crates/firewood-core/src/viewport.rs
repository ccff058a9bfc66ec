//! Filters records down to what the current map viewport shows.

use crate::geo::Bounds;
use crate::record::LocationRecord;

/// Returns the records whose coordinates fall inside `bounds` (edges
/// included), in input order.
///
/// Uses the same placement rule as [`crate::grouping::group_by_coordinates`],
/// so every listed record has a marker and every marker has listable records.
#[must_use]
pub fn filter_visible<'a, I>(records: I, bounds: &Bounds) -> Vec<&'a LocationRecord>
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    records
        .into_iter()
        .filter(|r| r.coordinates().is_some_and(|p| bounds.contains(p)))
        .collect()
}
