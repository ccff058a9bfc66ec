//! Application map state: the current record generation, its markers and
//! the last viewport reported by the map widget.
//!
//! Loads are two-phase. [`MapState::begin_load`] hands out a ticket for the
//! newest generation; [`MapState::finish_load`] applies a fetched result only
//! if its ticket is still the newest, so a slow response can never overwrite
//! a fresher one. Applying a load rebuilds markers synchronously before the
//! list is read again.

use crate::geo::{Bounds, Coordinates};
use crate::grouping::group_by_coordinates;
use crate::markers::{MapSurface, MarkerEntry, MarkerIndex};
use crate::popup::ListCard;
use crate::record::{LocationFilter, LocationId, LocationRecord};
use crate::viewport::filter_visible;

/// Zoom used when focusing a single record.
pub const FOCUS_ZOOM: u8 = 15;
/// Share of the marker span added on each side when fitting the view.
pub const FIT_PADDING: f64 = 0.1;

/// Proof that a load was started; carries its generation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Whether applying a load should move the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Fit the view to the new markers.
    FitToMarkers,
    /// Keep the current view (used after create/edit/delete/filter).
    Preserve,
}

/// Summary of an applied load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redraw {
    pub generation: u64,
    pub records: usize,
    pub markers: usize,
    pub visible: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(Redraw),
    /// A newer load was started after this one; its result was dropped.
    Stale { generation: u64, current: u64 },
}

#[derive(Debug)]
pub struct MapState<H> {
    generation: u64,
    records: Vec<LocationRecord>,
    markers: MarkerIndex<H>,
    viewport: Option<Bounds>,
}

impl<H> Default for MapState<H> {
    fn default() -> Self {
        Self {
            generation: 0,
            records: Vec::new(),
            markers: MarkerIndex::default(),
            viewport: None,
        }
    }
}

impl<H> MapState<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load generation. Any earlier outstanding ticket is now
    /// stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies fetched records if `ticket` is still the newest generation.
    ///
    /// The wood-type part of `filter` is applied here; records it rejects
    /// get neither a marker nor a list entry.
    pub fn finish_load<S>(
        &mut self,
        ticket: LoadTicket,
        records: Vec<LocationRecord>,
        filter: &LocationFilter,
        view: ViewMode,
        surface: &mut S,
    ) -> LoadOutcome
    where
        S: MapSurface<Handle = H>,
    {
        if ticket.generation != self.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding superseded location load"
            );
            return LoadOutcome::Stale {
                generation: ticket.generation,
                current: self.generation,
            };
        }

        self.records = records
            .into_iter()
            .filter(|r| filter.matches_wood_type(r))
            .collect();

        let groups = group_by_coordinates(&self.records);
        self.markers.rebuild(&groups, surface);

        if view == ViewMode::FitToMarkers {
            if let Some(bounds) = self.markers.bounds() {
                let padded = bounds.pad(FIT_PADDING);
                surface.fit_bounds(padded);
                self.viewport = Some(padded);
            }
        }

        let redraw = Redraw {
            generation: self.generation,
            records: self.records.len(),
            markers: self.markers.len(),
            visible: self.visible().len(),
        };
        tracing::debug!(
            generation = redraw.generation,
            records = redraw.records,
            markers = redraw.markers,
            visible = redraw.visible,
            "map redrawn"
        );
        LoadOutcome::Applied(redraw)
    }

    /// Records the viewport reported by the map and returns what it shows.
    pub fn set_viewport(&mut self, bounds: Bounds) -> Vec<&LocationRecord> {
        self.viewport = Some(bounds);
        self.visible()
    }

    /// Records in the current viewport; every placeable record before the
    /// map has reported one.
    #[must_use]
    pub fn visible(&self) -> Vec<&LocationRecord> {
        let bounds = self.viewport.unwrap_or_else(Bounds::world);
        filter_visible(&self.records, &bounds)
    }

    #[must_use]
    pub fn list_cards(&self) -> Vec<ListCard> {
        self.visible().into_iter().map(ListCard::from_record).collect()
    }

    /// Centres the map on a record and opens the popup of its marker.
    pub fn focus<S>(&self, id: LocationId, surface: &mut S) -> bool
    where
        S: MapSurface<Handle = H>,
    {
        let Some(entry) = self.markers.marker_containing(id) else {
            return false;
        };
        surface.set_view(entry.position, FOCUS_ZOOM);
        surface.open_popup(&entry.handle);
        true
    }

    /// Centres the map on arbitrary coordinates.
    pub fn focus_on<S>(&self, position: Coordinates, surface: &mut S)
    where
        S: MapSurface<Handle = H>,
    {
        surface.set_view(position, FOCUS_ZOOM);
    }

    #[must_use]
    pub fn find_marker(&self, representative_id: LocationId) -> Option<&MarkerEntry<H>> {
        self.markers.find_by_representative_id(representative_id)
    }

    #[must_use]
    pub fn record(&self, id: LocationId) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerIndex<H> {
        &self.markers
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
