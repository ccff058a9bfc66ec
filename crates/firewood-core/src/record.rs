//! Location records as stored in the hosted data API, plus the payloads the
//! application sends back.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinates;

/// Primary key of the location table.
pub type LocationId = i64;

/// One firewood sale location as returned by the data API.
///
/// Every descriptive field is optional. Rows with missing or invalid
/// coordinates are kept here and dropped later by the grouper and the
/// viewport filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub wood_type: Option<String>,
    /// Price in yen. Non-numeric legacy values deserialize as `None`.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sales_period: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub report_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    /// A bare record with only an id and coordinates; handy for tests and
    /// for seeding demo data.
    #[must_use]
    pub fn at(id: LocationId, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            id,
            latitude,
            longitude,
            location_name: None,
            wood_type: None,
            price: None,
            amount: None,
            notes: None,
            description: None,
            sales_period: None,
            contact_info: None,
            report_count: None,
            updated_at: None,
        }
    }

    /// Coordinates when the record can be placed on the map.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn report_count(&self) -> i64 {
        self.report_count.unwrap_or(0)
    }

    /// Free-text body shown in popups: description first, notes as fallback.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        non_blank(self.description.as_deref()).or_else(|| non_blank(self.notes.as_deref()))
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Decimal),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Accepts `timestamptz` (RFC 3339) and plain `timestamp` renderings.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Validated payload for inserting or patching a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationInput {
    pub location_name: String,
    pub wood_type: String,
    pub price: Decimal,
    pub amount: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub notes: Option<String>,
    pub sales_period: Option<String>,
    pub contact_info: Option<String>,
    pub description: Option<String>,
    /// Set on updates only; inserts rely on the column default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query-side filters applied when loading locations.
///
/// `search` is sent to the server as a case-insensitive name match;
/// `wood_type` is applied client-side after the fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub search: Option<String>,
    pub wood_type: Option<String>,
}

impl LocationFilter {
    #[must_use]
    pub fn new(search: Option<&str>, wood_type: Option<&str>) -> Self {
        Self {
            search: non_blank(search).map(str::to_owned),
            wood_type: non_blank(wood_type).map(str::to_owned),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.wood_type.is_none()
    }

    /// Case-insensitive substring match on `wood_type`. Records without a
    /// wood type never match an active filter.
    #[must_use]
    pub fn matches_wood_type(&self, record: &LocationRecord) -> bool {
        let Some(wanted) = &self.wood_type else {
            return true;
        };
        record
            .wood_type
            .as_deref()
            .is_some_and(|w| w.to_lowercase().contains(&wanted.to_lowercase()))
    }
}

/// Message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// One free-text address search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressCandidate {
    pub display_name: String,
    pub position: Coordinates,
}

/// Result of flagging a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    pub id: LocationId,
    pub report_count: i64,
    /// `true` once the count reaches the hide threshold.
    pub hidden: bool,
}

impl ReportOutcome {
    #[must_use]
    pub fn after_increment(id: LocationId, previous: i64, threshold: i64) -> Self {
        let report_count = previous.saturating_add(1);
        Self {
            id,
            report_count,
            hidden: report_count >= threshold,
        }
    }
}
