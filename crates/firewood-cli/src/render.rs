//! Plain-text rendering of map state for the terminal.

use std::fmt::Write as _;

use firewood_core::{
    AddressCandidate, Coordinates, DetailView, ListCard, MapState, Notice, NoticeLevel,
    PopupContent,
};

use crate::surface::{MarkerId, TextMap};

/// Truncate `s` to `max` characters, appending `...` when cut.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_owned()
    }
}

fn fmt_position(position: Coordinates) -> String {
    let (lat, lng) = position.format(5);
    format!("{lat}, {lng}")
}

pub(crate) fn list_table(cards: &[ListCard]) -> String {
    if cards.is_empty() {
        return "no locations in view\n".to_owned();
    }
    let mut out = format!("{:<8}{:<32}{:<20}PRICE\n", "ID", "NAME", "WOOD");
    for card in cards {
        let _ = writeln!(
            out,
            "{:<8}{:<32}{:<20}{}",
            card.id,
            clip(&card.title, 28),
            clip(&card.wood_type, 16),
            card.price
        );
    }
    out
}

pub(crate) fn popup_text(popup: &PopupContent) -> String {
    let mut out = String::new();
    for (index, section) in popup.sections().iter().enumerate() {
        if index > 0 {
            out.push_str("  --\n");
        }
        if let Some(headline) = &section.headline {
            let _ = writeln!(out, "  {headline}");
        }
        for field in &section.fields {
            let _ = writeln!(out, "    {}: {}", field.label.as_str(), field.value);
        }
        let _ = writeln!(out, "    [details: show {}]", section.record_id);
    }
    out
}

pub(crate) fn markers(map: &MapState<MarkerId>, html: bool) -> String {
    let index = map.markers();
    if index.is_empty() {
        return "no markers\n".to_owned();
    }
    let mut out = String::new();
    for entry in index.iter() {
        let _ = writeln!(
            out,
            "marker {} at {} ({} location{})",
            entry.representative_id,
            fmt_position(entry.position),
            entry.record_ids.len(),
            if entry.record_ids.len() == 1 { "" } else { "s" }
        );
        if html {
            let _ = writeln!(out, "{}", entry.popup.to_html());
        } else {
            out.push_str(&popup_text(&entry.popup));
        }
    }
    out
}

pub(crate) fn detail(view: &DetailView, html: bool) -> String {
    if html {
        return format!("{}\n", view.to_html());
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", view.name, view.id);
    let _ = writeln!(out, "  Wood type:     {}", view.wood_type);
    let _ = writeln!(out, "  Price/amount:  {}", view.price);
    let position = view
        .position
        .map_or_else(|| "unknown".to_owned(), fmt_position);
    let _ = writeln!(out, "  Position:      {position}");
    if let Some(notes) = &view.notes {
        let _ = writeln!(out, "  Details:       {notes}");
    }
    let _ = writeln!(out, "  Sales period:  {}", view.sales_period);
    let _ = writeln!(out, "  Contact:       {}", view.contact);
    let _ = writeln!(out, "  Last updated:  {}", view.last_updated);
    let _ = writeln!(out, "  Reports:       {}", view.report_count);
    if let Some(url) = view.maps_url() {
        let _ = writeln!(out, "  Map:           {url}");
    }
    out
}

pub(crate) fn candidates(candidates: &[AddressCandidate]) -> String {
    let mut out = String::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} ({})",
            index + 1,
            candidate.display_name,
            fmt_position(candidate.position)
        );
    }
    out
}

pub(crate) fn view(map: &TextMap) -> String {
    let mut out = format!(
        "view centre {} zoom {}\n",
        fmt_position(map.center()),
        map.zoom()
    );
    if let Some((position, popup)) = map.open_popup() {
        let _ = writeln!(out, "open popup at {}", fmt_position(position));
        out.push_str(&popup_text(popup));
    }
    out
}

pub(crate) fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}
