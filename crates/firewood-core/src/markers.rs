//! Marker projection and the representative-id reverse index.
//!
//! The map widget is reached only through [`MapSurface`]. Each redraw
//! removes every marker the previous projection placed and builds a fresh
//! [`MarkerIndex`]; nothing from an older projection stays reachable.

use std::collections::HashMap;

use crate::geo::{Bounds, Coordinates};
use crate::grouping::CoordinateGroup;
use crate::popup::{build_content, PopupContent};
use crate::record::LocationId;

/// Marker primitives of the interactive map widget.
pub trait MapSurface {
    /// Opaque marker handle issued by the widget.
    type Handle;

    fn place_marker(&mut self, position: Coordinates, popup: &PopupContent) -> Self::Handle;
    fn remove_marker(&mut self, handle: Self::Handle);
    fn open_popup(&mut self, handle: &Self::Handle);
    fn fit_bounds(&mut self, bounds: Bounds);
    fn set_view(&mut self, center: Coordinates, zoom: u8);
}

/// One placed marker and the records it stands for.
#[derive(Debug)]
pub struct MarkerEntry<H> {
    pub representative_id: LocationId,
    pub position: Coordinates,
    /// Ids of every record in the group, in group order.
    pub record_ids: Vec<LocationId>,
    pub popup: PopupContent,
    pub handle: H,
}

/// Markers of one data generation, keyed by representative id.
#[derive(Debug)]
pub struct MarkerIndex<H> {
    entries: Vec<MarkerEntry<H>>,
    by_representative: HashMap<LocationId, usize>,
    by_member: HashMap<LocationId, usize>,
}

impl<H> Default for MarkerIndex<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_representative: HashMap::new(),
            by_member: HashMap::new(),
        }
    }
}

impl<H> MarkerIndex<H> {
    /// Places one marker per group and indexes it.
    pub fn project<S>(groups: &[CoordinateGroup<'_>], surface: &mut S) -> Self
    where
        S: MapSurface<Handle = H>,
    {
        let mut index = Self::default();
        for group in groups {
            let popup = build_content(group);
            let handle = surface.place_marker(group.position, &popup);
            let slot = index.entries.len();
            let representative_id = group.representative_id();

            // Duplicate ids across groups: the first marker keeps the key.
            index.by_representative.entry(representative_id).or_insert(slot);
            for record in &group.records {
                index.by_member.entry(record.id).or_insert(slot);
            }

            index.entries.push(MarkerEntry {
                representative_id,
                position: group.position,
                record_ids: group.records.iter().map(|r| r.id).collect(),
                popup,
                handle,
            });
        }
        index
    }

    /// Removes every marker from the surface and empties the index.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: MapSurface<Handle = H>,
    {
        self.by_representative.clear();
        self.by_member.clear();
        for entry in self.entries.drain(..) {
            surface.remove_marker(entry.handle);
        }
    }

    /// Replaces this index with a projection of `groups`.
    pub fn rebuild<S>(&mut self, groups: &[CoordinateGroup<'_>], surface: &mut S)
    where
        S: MapSurface<Handle = H>,
    {
        self.clear(surface);
        *self = Self::project(groups, surface);
    }

    #[must_use]
    pub fn find_by_representative_id(&self, id: LocationId) -> Option<&MarkerEntry<H>> {
        self.by_representative.get(&id).map(|&slot| &self.entries[slot])
    }

    /// Marker showing `id`, whether or not it is the group's first record.
    #[must_use]
    pub fn marker_containing(&self, id: LocationId) -> Option<&MarkerEntry<H>> {
        self.by_member.get(&id).map(|&slot| &self.entries[slot])
    }

    /// Opens the popup of the marker showing `id`. Returns `false` when no
    /// marker of the current generation shows it.
    pub fn open_popup<S>(&self, id: LocationId, surface: &mut S) -> bool
    where
        S: MapSurface<Handle = H>,
    {
        match self.marker_containing(id) {
            Some(entry) => {
                surface.open_popup(&entry.handle);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerEntry<H>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bounds enclosing every marker.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.entries.iter().map(|e| e.position))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;
    use crate::grouping::group_by_coordinates;
    use crate::record::LocationRecord;

    fn sample() -> Vec<LocationRecord> {
        vec![
            LocationRecord::at(1, Some(35.0), Some(139.0)),
            LocationRecord::at(2, Some(35.0), Some(139.0)),
            LocationRecord::at(3, Some(34.0), Some(135.0)),
            LocationRecord::at(4, None, Some(139.0)),
        ]
    }

    #[test]
    fn one_marker_per_group_keyed_by_first_record() {
        let records = sample();
        let groups = group_by_coordinates(&records);
        let mut surface = RecordingSurface::default();
        let index = MarkerIndex::project(&groups, &mut surface);

        assert_eq!(index.len(), 2);
        assert_eq!(surface.live.len(), 2);

        let first = index.find_by_representative_id(1).expect("marker for 1");
        assert_eq!(first.position, Coordinates::new(35.0, 139.0).unwrap());
        assert_eq!(first.record_ids, vec![1, 2]);
        assert_eq!(index.find_by_representative_id(3).unwrap().record_ids, vec![3]);
    }

    #[test]
    fn non_representative_and_dropped_ids_are_not_keys() {
        let records = sample();
        let groups = group_by_coordinates(&records);
        let index = MarkerIndex::project(&groups, &mut RecordingSurface::default());

        assert!(index.find_by_representative_id(2).is_none());
        assert!(index.find_by_representative_id(4).is_none());
        assert_eq!(index.marker_containing(2).unwrap().representative_id, 1);
        assert!(index.marker_containing(4).is_none());
    }

    #[test]
    fn rebuild_removes_stale_markers() {
        let records = sample();
        let groups = group_by_coordinates(&records);
        let mut surface = RecordingSurface::default();
        let mut index = MarkerIndex::project(&groups, &mut surface);

        let next = vec![LocationRecord::at(3, Some(34.0), Some(135.0))];
        let next_groups = group_by_coordinates(&next);
        index.rebuild(&next_groups, &mut surface);

        assert_eq!(index.len(), 1);
        assert_eq!(surface.live, vec![3]);
        assert!(index.find_by_representative_id(1).is_none());
        assert!(index.marker_containing(2).is_none());
        assert!(index.find_by_representative_id(3).is_some());
    }

    #[test]
    fn open_popup_uses_member_lookup() {
        let records = sample();
        let groups = group_by_coordinates(&records);
        let mut surface = RecordingSurface::default();
        let index = MarkerIndex::project(&groups, &mut surface);

        assert!(index.open_popup(2, &mut surface));
        assert!(!index.open_popup(99, &mut surface));
        assert_eq!(surface.opened, vec![1]);
    }

    #[test]
    fn bounds_cover_all_markers() {
        let records = sample();
        let groups = group_by_coordinates(&records);
        let index = MarkerIndex::project(&groups, &mut RecordingSurface::default());
        let b = index.bounds().unwrap();
        assert_eq!(b.south_west, Coordinates::new(34.0, 135.0).unwrap());
        assert_eq!(b.north_east, Coordinates::new(35.0, 139.0).unwrap());

        let empty: MarkerIndex<u32> = MarkerIndex::default();
        assert!(empty.bounds().is_none());
    }
}
