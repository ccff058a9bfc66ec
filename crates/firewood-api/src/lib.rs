//! HTTP clients for the firewood map: the hosted location store and the
//! address geocoder.

pub mod error;
pub mod geocode;
mod http;
pub mod locations;
mod retry;

pub use error::ApiError;
pub use geocode::NominatimClient;
pub use locations::LocationsClient;
