//! Domain model for the firewood sale-location map: records, coordinate
//! grouping, popup and list content, viewport filtering, marker bookkeeping
//! and the UI state machine. Nothing here talks to the network.

pub mod app_config;
pub mod config;
pub mod error;
pub mod form;
pub mod geo;
pub mod grouping;
pub mod markers;
pub mod popup;
pub mod record;
pub mod state;
pub mod ui;
pub mod viewport;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ValidationError};
pub use form::{ContactForm, LocationForm};
pub use geo::{Bounds, Coordinates};
pub use grouping::{group_by_coordinates, CoordinateGroup};
pub use markers::{MapSurface, MarkerEntry, MarkerIndex};
pub use popup::{build_content, AddHereHandoff, DetailView, ListCard, PopupContent};
pub use record::{
    AddressCandidate, ContactMessage, LocationFilter, LocationId, LocationInput, LocationRecord,
    ReportOutcome,
};
pub use state::{LoadOutcome, LoadTicket, MapState, Redraw, ViewMode};
pub use ui::{Command, FormMode, Modal, Notice, NoticeLevel, Operation, UiAction, UiState};
pub use viewport::filter_visible;
