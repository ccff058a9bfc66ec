//! Partitions records into groups that share an exact coordinate pair.

use std::collections::HashMap;

use crate::geo::{CoordKey, Coordinates};
use crate::record::{LocationId, LocationRecord};

/// Records sharing one exact (latitude, longitude), in input order.
///
/// Only [`group_by_coordinates`] builds these, so every group holds at
/// least one record.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGroup<'a> {
    pub(crate) position: Coordinates,
    pub(crate) records: Vec<&'a LocationRecord>,
}

impl<'a> CoordinateGroup<'a> {
    #[must_use]
    pub fn position(&self) -> Coordinates {
        self.position
    }

    #[must_use]
    pub fn records(&self) -> &[&'a LocationRecord] {
        &self.records
    }

    /// Id of the first record; the group's external lookup key.
    #[must_use]
    pub fn representative_id(&self) -> LocationId {
        self.records[0].id
    }

    #[must_use]
    pub fn headline(&self) -> &LocationRecord {
        self.records[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups records by exact coordinates.
///
/// Records that cannot be placed (missing, non-finite or out-of-range
/// coordinates) are skipped. Groups come out in first-seen order and every
/// group holds at least one record.
#[must_use]
pub fn group_by_coordinates<'a, I>(records: I) -> Vec<CoordinateGroup<'a>>
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    let mut groups: Vec<CoordinateGroup<'a>> = Vec::new();
    let mut slots: HashMap<CoordKey, usize> = HashMap::new();

    for record in records {
        let Some(position) = record.coordinates() else {
            continue;
        };
        match slots.get(&position.key()) {
            Some(&slot) => groups[slot].records.push(record),
            None => {
                slots.insert(position.key(), groups.len());
                groups.push(CoordinateGroup {
                    position,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: LocationId, lat: Option<f64>, lng: Option<f64>, name: &str) -> LocationRecord {
        let mut r = LocationRecord::at(id, lat, lng);
        r.location_name = Some(name.to_string());
        r
    }

    fn sample() -> Vec<LocationRecord> {
        vec![
            named(1, Some(35.0), Some(139.0), "A"),
            named(2, Some(35.0), Some(139.0), "B"),
            named(3, Some(34.0), Some(135.0), "C"),
            named(4, None, Some(139.0), "D"),
        ]
    }

    fn ids(group: &CoordinateGroup<'_>) -> Vec<LocationId> {
        group.records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn groups_shared_coordinates_and_drops_missing() {
        let records = sample();
        let groups = group_by_coordinates(&records);

        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec![1, 2]);
        assert_eq!(groups[0].position, Coordinates::new(35.0, 139.0).unwrap());
        assert_eq!(ids(&groups[1]), vec![3]);
        assert_eq!(groups[1].representative_id(), 3);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_coordinates(&Vec::<LocationRecord>::new()).is_empty());
    }

    #[test]
    fn preserves_first_seen_order_across_interleaving() {
        let records = vec![
            LocationRecord::at(10, Some(1.0), Some(1.0)),
            LocationRecord::at(11, Some(2.0), Some(2.0)),
            LocationRecord::at(12, Some(1.0), Some(1.0)),
            LocationRecord::at(13, Some(2.0), Some(2.0)),
        ];
        let groups = group_by_coordinates(&records);
        assert_eq!(ids(&groups[0]), vec![10, 12]);
        assert_eq!(ids(&groups[1]), vec![11, 13]);
    }

    #[test]
    fn near_identical_fixes_stay_separate() {
        let records = vec![
            LocationRecord::at(1, Some(35.0), Some(139.0)),
            LocationRecord::at(2, Some(35.000_000_1), Some(139.0)),
        ];
        assert_eq!(group_by_coordinates(&records).len(), 2);
    }

    #[test]
    fn every_group_leads_with_its_first_record() {
        let records = sample();
        for group in group_by_coordinates(&records) {
            assert!(!group.is_empty());
            assert_eq!(group.headline().id, group.records()[0].id);
            assert_eq!(group.representative_id(), group.headline().id);
            assert_eq!(group.position(), group.headline().coordinates().unwrap());
        }
    }

    #[test]
    fn duplicate_ids_are_kept() {
        let records = vec![
            LocationRecord::at(1, Some(35.0), Some(139.0)),
            LocationRecord::at(1, Some(35.0), Some(139.0)),
        ];
        let groups = group_by_coordinates(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn flattened_groups_are_exactly_the_placeable_records() {
        let mut records = sample();
        records.push(LocationRecord::at(5, Some(120.0), Some(10.0)));
        records.push(LocationRecord::at(6, Some(34.0), Some(135.0)));
        records.push(LocationRecord::at(7, Some(f64::NAN), Some(135.0)));

        let groups = group_by_coordinates(&records);
        let mut flattened: Vec<LocationId> = groups.iter().flat_map(ids).collect();
        flattened.sort_unstable();
        assert_eq!(flattened, vec![1, 2, 3, 6]);
    }
}
