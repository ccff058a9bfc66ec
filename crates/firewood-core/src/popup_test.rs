use chrono::TimeZone;

use super::*;
use crate::grouping::group_by_coordinates;

fn record(id: LocationId, name: Option<&str>) -> LocationRecord {
    let mut r = LocationRecord::at(id, Some(35.0), Some(139.0));
    r.location_name = name.map(str::to_owned);
    r
}

fn field<'a>(section: &'a PopupSection, label: FieldLabel) -> &'a str {
    section
        .fields
        .iter()
        .find(|f| f.label == label)
        .map(|f| f.value.as_str())
        .expect("field present")
}

#[test]
fn single_record_group_has_one_headlined_section() {
    let mut r = record(1, Some("Yamada Farm"));
    r.wood_type = Some("Oak".to_string());
    r.price = Some(Decimal::from(1500));
    r.amount = Some("1 bundle".to_string());
    let records = vec![r];
    let groups = group_by_coordinates(&records);

    let content = build_content(&groups[0]);
    assert_eq!(content.sections.len(), 1);
    let section = &content.sections[0];
    assert_eq!(section.headline.as_deref(), Some("Yamada Farm"));
    assert_eq!(field(section, FieldLabel::WoodType), "Oak");
    assert_eq!(field(section, FieldLabel::Price), "1500円 / 1 bundle");
}

#[test]
fn only_first_section_of_a_group_is_headlined() {
    let records = vec![record(1, Some("A")), record(2, Some("B"))];
    let groups = group_by_coordinates(&records);

    let content = build_content(&groups[0]);
    assert_eq!(content.sections.len(), 2);
    assert_eq!(content.sections[0].headline.as_deref(), Some("A"));
    assert!(content.sections[1].headline.is_none());
    assert_eq!(content.representative_id(), 1);
}

#[test]
fn missing_fields_render_placeholder_not_omitted() {
    let records = vec![record(1, None)];
    let groups = group_by_coordinates(&records);
    let section = &build_content(&groups[0]).sections[0];

    assert_eq!(section.headline.as_deref(), Some(PLACEHOLDER));
    assert_eq!(section.fields.len(), 5);
    assert!(section.fields.iter().all(|f| f.value == PLACEHOLDER));
}

#[test]
fn details_prefer_description_over_notes() {
    let mut r = record(1, Some("A"));
    r.notes = Some("Ring the bell".to_string());
    r.description = Some("Honesty box".to_string());
    let records = vec![r];
    let groups = group_by_coordinates(&records);
    let section = &build_content(&groups[0]).sections[0];
    assert_eq!(field(section, FieldLabel::Details), "Honesty box");
}

#[test]
fn details_fall_back_to_notes() {
    let mut r = record(1, Some("A"));
    r.description = Some("   ".to_string());
    r.notes = Some("Ring the bell".to_string());
    let records = vec![r];
    let groups = group_by_coordinates(&records);
    let section = &build_content(&groups[0]).sections[0];
    assert_eq!(field(section, FieldLabel::Details), "Ring the bell");
}

#[test]
fn detail_view_shows_notes_only() {
    let mut r = record(1, Some("A"));
    r.description = Some("Honesty box".to_string());
    assert_eq!(DetailView::from_record(&r).notes, None);

    r.notes = Some("Ring the bell".to_string());
    assert_eq!(DetailView::from_record(&r).notes.as_deref(), Some("Ring the bell"));
}

#[test]
fn add_here_handoff_tolerates_missing_name() {
    let records = vec![record(1, Some("")), record(2, Some("Second"))];
    let groups = group_by_coordinates(&records);
    let content = build_content(&groups[0]);
    assert_eq!(content.add_here.name, None);
    assert_eq!(content.add_here.position, Coordinates::new(35.0, 139.0).unwrap());
}

#[test]
fn html_output_escapes_user_text() {
    let mut r = record(1, Some("<script>alert('x')</script>"));
    r.contact_info = Some("a&b \"c\"".to_string());
    let records = vec![r];
    let groups = group_by_coordinates(&records);
    let html = build_content(&groups[0]).to_html();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(html.contains("a&amp;b &quot;c&quot;"));
    assert!(html.contains("data-id=\"1\""));
}

#[test]
fn price_line_variants() {
    assert_eq!(price_line(None, None), PLACEHOLDER);
    assert_eq!(price_line(Some(Decimal::new(15005, 1)), None), "1500.5円");
    assert_eq!(price_line(Some(Decimal::new(80000, 2)), None), "800円");
    assert_eq!(price_line(None, Some("10kg")), "not set / 10kg");
}

#[test]
fn list_card_uses_placeholders() {
    let card = ListCard::from_record(&record(4, None));
    assert_eq!(card.id, 4);
    assert_eq!(card.title, PLACEHOLDER);
    assert_eq!(card.wood_type, PLACEHOLDER);
    assert_eq!(card.price, PLACEHOLDER);
}

#[test]
fn detail_view_formats_date_and_link() {
    let mut r = record(9, Some("Mori"));
    r.updated_at = Some(Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap());
    r.report_count = Some(3);
    let view = DetailView::from_record(&r);

    assert_eq!(view.last_updated, "2025/03/07");
    assert_eq!(view.report_count, 3);
    assert_eq!(
        view.maps_url().as_deref(),
        Some("https://www.google.com/maps/search/?api=1&query=35,139")
    );
    assert!(view.to_html().contains("query=35,139"));
}

#[test]
fn detail_view_without_timestamp_or_coordinates() {
    let r = LocationRecord::at(3, None, None);
    let view = DetailView::from_record(&r);
    assert_eq!(view.last_updated, "unknown");
    assert!(view.maps_url().is_none());
    assert!(view.notes.is_none());
}

#[test]
fn escape_html_leaves_plain_text_alone() {
    assert_eq!(escape_html("薪 / firewood"), "薪 / firewood");
}
