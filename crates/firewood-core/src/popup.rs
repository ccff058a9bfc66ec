//! Presentation payloads: marker popups, list-panel cards and the detail
//! view.
//!
//! Payloads are plain data. [`PopupContent::to_html`] and
//! [`DetailView::to_html`] render them to markup, escaping every
//! user-supplied value on the way out.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::geo::Coordinates;
use crate::grouping::CoordinateGroup;
use crate::record::{non_blank, LocationId, LocationRecord};

/// Shown for any field that has no value.
pub const PLACEHOLDER: &str = "not set";
pub const CURRENCY_SUFFIX: &str = "円";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    WoodType,
    Price,
    Details,
    SalesPeriod,
    Contact,
}

impl FieldLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::WoodType => "Wood type",
            FieldLabel::Price => "Price",
            FieldLabel::Details => "Details",
            FieldLabel::SalesPeriod => "Sales period",
            FieldLabel::Contact => "Contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupField {
    pub label: FieldLabel,
    /// Display text, unescaped.
    pub value: String,
}

/// One record's block inside a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSection {
    pub record_id: LocationId,
    /// Location name; only the first section of a group carries one.
    pub headline: Option<String>,
    pub fields: Vec<PopupField>,
}

/// Coordinates and name passed to the create form when the user picks an
/// existing marker as the spot for a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct AddHereHandoff {
    pub position: Coordinates,
    pub name: Option<String>,
}

/// Popup payload for one marker. Built by [`build_content`], which emits one
/// section per grouped record, so `sections` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub(crate) sections: Vec<PopupSection>,
    pub add_here: AddHereHandoff,
}

/// Builds the popup payload for a coordinate group.
#[must_use]
pub fn build_content(group: &CoordinateGroup<'_>) -> PopupContent {
    let sections = group
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| PopupSection {
            record_id: record.id,
            headline: (index == 0).then(|| display_name(record).to_owned()),
            fields: popup_fields(record),
        })
        .collect();

    PopupContent {
        sections,
        add_here: AddHereHandoff {
            position: group.position,
            name: non_blank(group.headline().location_name.as_deref()).map(str::to_owned),
        },
    }
}

fn popup_fields(record: &LocationRecord) -> Vec<PopupField> {
    vec![
        PopupField {
            label: FieldLabel::WoodType,
            value: text_or_placeholder(record.wood_type.as_deref()),
        },
        PopupField {
            label: FieldLabel::Price,
            value: price_line(record.price, record.amount.as_deref()),
        },
        PopupField {
            label: FieldLabel::Details,
            value: text_or_placeholder(record.details()),
        },
        PopupField {
            label: FieldLabel::SalesPeriod,
            value: text_or_placeholder(record.sales_period.as_deref()),
        },
        PopupField {
            label: FieldLabel::Contact,
            value: text_or_placeholder(record.contact_info.as_deref()),
        },
    ]
}

fn display_name(record: &LocationRecord) -> &str {
    non_blank(record.location_name.as_deref()).unwrap_or(PLACEHOLDER)
}

fn text_or_placeholder(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(PLACEHOLDER).to_owned()
}

/// `1500円 / 1 bundle`, or the placeholder when neither value is known.
#[must_use]
pub fn price_line(price: Option<Decimal>, amount: Option<&str>) -> String {
    let amount = non_blank(amount);
    let mut line = match (price, amount) {
        (None, None) => return PLACEHOLDER.to_owned(),
        (Some(p), _) => format!("{}{CURRENCY_SUFFIX}", p.normalize()),
        (None, Some(_)) => PLACEHOLDER.to_owned(),
    };
    if let Some(a) = amount {
        let _ = write!(line, " / {a}");
    }
    line
}

impl PopupContent {
    /// Record blocks in group order; the first carries the headline.
    #[must_use]
    pub fn sections(&self) -> &[PopupSection] {
        &self.sections
    }

    #[must_use]
    pub fn representative_id(&self) -> LocationId {
        self.sections[0].record_id
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"popup\">");
        for (index, section) in self.sections.iter().enumerate() {
            let class = if index == 0 {
                "popup-entry popup-entry-head"
            } else {
                "popup-entry popup-entry-more"
            };
            let _ = write!(html, "<div class=\"{class}\">");
            if let Some(headline) = &section.headline {
                let _ = write!(html, "<h3>{}</h3>", escape_html(headline));
            }
            for field in &section.fields {
                let _ = write!(
                    html,
                    "<p><strong>{}:</strong> {}</p>",
                    field.label.as_str(),
                    escape_html(&field.value)
                );
            }
            let _ = write!(
                html,
                "<button data-action=\"view-details\" data-id=\"{}\">View details</button></div>",
                section.record_id
            );
        }
        html.push_str("</div>");
        html
    }
}

/// Summary shown in the list panel for one visible record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCard {
    pub id: LocationId,
    pub title: String,
    pub wood_type: String,
    pub price: String,
}

impl ListCard {
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Self {
        Self {
            id: record.id,
            title: display_name(record).to_owned(),
            wood_type: text_or_placeholder(record.wood_type.as_deref()),
            price: price_line(record.price, record.amount.as_deref()),
        }
    }
}

/// Everything the detail modal shows for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: LocationId,
    pub name: String,
    pub wood_type: String,
    pub price: String,
    pub position: Option<Coordinates>,
    pub notes: Option<String>,
    pub sales_period: String,
    pub contact: String,
    /// `YYYY/MM/DD`, or `unknown`.
    pub last_updated: String,
    pub report_count: i64,
}

impl DetailView {
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Self {
        Self {
            id: record.id,
            name: display_name(record).to_owned(),
            wood_type: text_or_placeholder(record.wood_type.as_deref()),
            price: price_line(record.price, record.amount.as_deref()),
            position: record.coordinates(),
            notes: non_blank(record.notes.as_deref()).map(str::to_owned),
            sales_period: text_or_placeholder(record.sales_period.as_deref()),
            contact: text_or_placeholder(record.contact_info.as_deref()),
            last_updated: format_last_updated(record.updated_at),
            report_count: record.report_count(),
        }
    }

    /// External map link for the record, when it has coordinates.
    #[must_use]
    pub fn maps_url(&self) -> Option<String> {
        self.position.map(|p| {
            format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                p.latitude, p.longitude
            )
        })
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let mut section = |title: &str, body: &str| {
            let _ = write!(
                html,
                "<div class=\"detail-section\"><h3>{title}</h3><p>{}</p></div>",
                escape_html(body)
            );
        };
        section("Name", &self.name);
        section("Wood type", &self.wood_type);
        section("Price / amount", &self.price);
        let position = self
            .position
            .map_or_else(|| PLACEHOLDER.to_owned(), |p| p.to_string());
        section("Position", &position);
        if let Some(notes) = &self.notes {
            section("Notes", notes);
        }
        section("Sales period", &self.sales_period);
        section("Contact", &self.contact);
        section("Last updated", &self.last_updated);
        if let Some(url) = self.maps_url() {
            let _ = write!(
                html,
                "<a class=\"btn btn-outline\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Open in Google Maps</a>",
                escape_html(&url)
            );
        }
        html
    }
}

fn format_last_updated(updated_at: Option<DateTime<Utc>>) -> String {
    updated_at.map_or_else(
        || "unknown".to_owned(),
        |ts| ts.format("%Y/%m/%d").to_string(),
    )
}

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "popup_test.rs"]
mod tests;
