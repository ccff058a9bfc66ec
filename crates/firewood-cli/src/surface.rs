//! In-memory map widget for the terminal front end.
//!
//! Mirrors what a browser map would hold: placed markers with their popups,
//! the single open popup, and the current centre and zoom.

use std::collections::BTreeMap;

use firewood_core::{Bounds, Coordinates, MapSurface, PopupContent};

pub(crate) type MarkerId = u32;

#[derive(Debug)]
struct PlacedMarker {
    position: Coordinates,
    popup: PopupContent,
}

#[derive(Debug)]
pub(crate) struct TextMap {
    next_id: MarkerId,
    markers: BTreeMap<MarkerId, PlacedMarker>,
    open_popup: Option<MarkerId>,
    center: Coordinates,
    zoom: u8,
    fitted: Option<Bounds>,
}

impl TextMap {
    pub(crate) fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            next_id: 0,
            markers: BTreeMap::new(),
            open_popup: None,
            center,
            zoom,
            fitted: None,
        }
    }

    pub(crate) fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Position and popup of the marker whose popup is open.
    pub(crate) fn open_popup(&self) -> Option<(Coordinates, &PopupContent)> {
        let id = self.open_popup?;
        self.markers.get(&id).map(|m| (m.position, &m.popup))
    }

    pub(crate) fn center(&self) -> Coordinates {
        self.center
    }

    pub(crate) fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Bounds of the last fit, cleared by any explicit `set_view`.
    pub(crate) fn fitted(&self) -> Option<Bounds> {
        self.fitted
    }
}

impl MapSurface for TextMap {
    type Handle = MarkerId;

    fn place_marker(&mut self, position: Coordinates, popup: &PopupContent) -> MarkerId {
        self.next_id += 1;
        self.markers.insert(
            self.next_id,
            PlacedMarker {
                position,
                popup: popup.clone(),
            },
        );
        self.next_id
    }

    fn remove_marker(&mut self, handle: MarkerId) {
        self.markers.remove(&handle);
        if self.open_popup == Some(handle) {
            self.open_popup = None;
        }
    }

    fn open_popup(&mut self, handle: &MarkerId) {
        if self.markers.contains_key(handle) {
            self.open_popup = Some(*handle);
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.center = bounds.center();
        self.fitted = Some(bounds);
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
        self.fitted = None;
    }
}
