//! Form drafts and their validation into API payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::geo::{Coordinates, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
use crate::popup::AddHereHandoff;
use crate::record::{non_blank, ContactMessage, LocationInput, LocationRecord};

/// Decimal places written into coordinate inputs.
pub const COORDINATE_DECIMALS: usize = 6;

/// Raw text of the create/edit form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationForm {
    pub location_name: String,
    pub wood_type: String,
    pub price: String,
    pub amount: String,
    pub latitude: String,
    pub longitude: String,
    pub notes: String,
    pub sales_period: String,
    pub contact_info: String,
    pub description: String,
}

impl LocationForm {
    /// Pre-fills the edit form from a stored record.
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            location_name: text(&record.location_name),
            wood_type: text(&record.wood_type),
            price: record.price.map(|p| p.normalize().to_string()).unwrap_or_default(),
            amount: text(&record.amount),
            latitude: record.latitude.map(|v| v.to_string()).unwrap_or_default(),
            longitude: record.longitude.map(|v| v.to_string()).unwrap_or_default(),
            notes: text(&record.notes),
            sales_period: text(&record.sales_period),
            contact_info: text(&record.contact_info),
            description: text(&record.description),
        }
    }

    /// Writes picked coordinates into the form.
    pub fn set_position(&mut self, position: Coordinates) {
        let (lat, lng) = position.format(COORDINATE_DECIMALS);
        self.latitude = lat;
        self.longitude = lng;
    }

    /// Applies a marker's "add here" handoff: coordinates always, name only
    /// when the marker has one.
    pub fn apply_handoff(&mut self, handoff: &AddHereHandoff) {
        self.set_position(handoff.position);
        if let Some(name) = &handoff.name {
            self.location_name.clone_from(name);
        }
    }

    /// Validates the draft for insertion.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking name, wood
    /// type, price, coordinate format, then coordinate ranges.
    pub fn validate(&self) -> Result<LocationInput, ValidationError> {
        let location_name = required(&self.location_name, ValidationError::MissingName)?;
        let wood_type = required(&self.wood_type, ValidationError::MissingWoodType)?;
        let raw_price = required(&self.price, ValidationError::MissingPrice)?;
        let price: Decimal = raw_price
            .parse()
            .map_err(|_| ValidationError::InvalidPrice(raw_price.clone()))?;
        if price.is_sign_negative() {
            return Err(ValidationError::InvalidPrice(raw_price));
        }

        let latitude = parse_coordinate(&self.latitude)?;
        let longitude = parse_coordinate(&self.longitude)?;
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }

        Ok(LocationInput {
            location_name,
            wood_type,
            price,
            amount: optional(&self.amount),
            latitude,
            longitude,
            notes: optional(&self.notes),
            sales_period: optional(&self.sales_period),
            contact_info: optional(&self.contact_info),
            description: optional(&self.description),
            updated_at: None,
        })
    }

    /// Validates the draft for an update, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Same as [`LocationForm::validate`].
    pub fn validate_update(&self, now: DateTime<Utc>) -> Result<LocationInput, ValidationError> {
        let mut input = self.validate()?;
        input.updated_at = Some(now);
        Ok(input)
    }
}

fn required(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    non_blank(Some(value)).map(str::to_owned).ok_or(err)
}

fn optional(value: &str) -> Option<String> {
    non_blank(Some(value)).map(str::to_owned)
}

fn parse_coordinate(raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::InvalidCoordinates)
}

/// Raw text of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteContact`] if any field is blank.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ContactMessage, ValidationError> {
        match (
            optional(&self.name),
            optional(&self.email),
            optional(&self.message),
        ) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email,
                message,
                created_at: now,
            }),
            _ => Err(ValidationError::IncompleteContact),
        }
    }
}
