use chrono::TimeZone;
use rust_decimal::Decimal;

use super::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn filled_form() -> LocationForm {
    LocationForm {
        location_name: "Yamada Farm".to_string(),
        wood_type: "Oak".to_string(),
        price: "1500".to_string(),
        latitude: "35".to_string(),
        longitude: "139".to_string(),
        ..LocationForm::default()
    }
}

fn notices(commands: &[Command]) -> Vec<&Notice> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::Notify(n) => Some(n),
            _ => None,
        })
        .collect()
}

#[test]
fn starts_collapsed_in_create_mode() {
    let ui = UiState::new();
    assert!(ui.list_collapsed);
    assert_eq!(ui.form_mode, FormMode::Create);
    assert_eq!(
        ui.startup(),
        Command::Reload {
            filter: LocationFilter::default(),
            view: ViewMode::FitToMarkers
        }
    );
}

#[test]
fn map_click_outside_selection_mode_does_nothing() {
    let mut ui = UiState::new();
    let commands = ui.dispatch(UiAction::MapClicked(Coordinates::new(35.0, 139.0).unwrap()));
    assert!(commands.is_empty());
    assert!(ui.form.latitude.is_empty());
}

#[test]
fn map_selection_fills_coordinates_and_reopens_form() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::OpenAddForm);
    ui.dispatch(UiAction::StartMapSelection);
    assert!(ui.selecting);
    assert_eq!(ui.open_modal, None);

    let commands = ui.dispatch(UiAction::MapClicked(
        Coordinates::new(35.123_456_7, 139.0).unwrap(),
    ));
    assert!(!ui.selecting);
    assert_eq!(ui.open_modal, Some(Modal::LocationForm));
    assert_eq!(ui.form.latitude, "35.123457");
    assert_eq!(ui.form.longitude, "139.000000");
    assert_eq!(
        notices(&commands)[0].message,
        "picked coordinates (35.1235, 139.0000)"
    );
}

#[test]
fn marker_selection_copies_name() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::StartMapSelection);
    ui.dispatch(UiAction::MarkerClicked(AddHereHandoff {
        position: Coordinates::new(34.0, 135.0).unwrap(),
        name: Some("Mori".to_string()),
    }));
    assert_eq!(ui.form.location_name, "Mori");
    assert_eq!(ui.form.latitude, "34.000000");
}

#[test]
fn submit_in_create_mode_emits_create() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::OpenAddForm);
    ui.dispatch(UiAction::UpdateForm(Box::new(filled_form())));

    let commands = ui.dispatch_at(UiAction::SubmitForm, now());
    match commands.as_slice() {
        [Command::Create(input)] => {
            assert_eq!(input.price, Decimal::from(1500));
            assert!(input.updated_at.is_none());
        }
        other => panic!("expected Create, got {other:?}"),
    }
}

#[test]
fn submit_in_edit_mode_emits_update_with_timestamp() {
    let mut ui = UiState::new();
    let mut record = LocationRecord::at(42, Some(35.0), Some(139.0));
    record.location_name = Some("Old".to_string());
    record.wood_type = Some("Oak".to_string());
    record.price = Some(Decimal::from(900));
    ui.dispatch(UiAction::EditLoaded(Box::new(record)));
    assert_eq!(ui.form_mode, FormMode::Edit(42));
    assert_eq!(ui.open_modal, Some(Modal::LocationForm));

    let commands = ui.dispatch_at(UiAction::SubmitForm, now());
    match commands.as_slice() {
        [Command::Update { id, input }] => {
            assert_eq!(*id, 42);
            assert_eq!(input.location_name, "Old");
            assert_eq!(input.updated_at, Some(now()));
        }
        other => panic!("expected Update, got {other:?}"),
    }
}

#[test]
fn invalid_submit_only_notifies() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::OpenAddForm);
    let commands = ui.dispatch(UiAction::SubmitForm);
    assert_eq!(commands.len(), 1);
    let notice = notices(&commands)[0];
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "enter a location name");
    assert_eq!(ui.open_modal, Some(Modal::LocationForm));
}

#[test]
fn saved_resets_mode_and_reloads_preserving_view() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::EditLoaded(Box::new(LocationRecord::at(
        7,
        Some(1.0),
        Some(1.0),
    ))));
    ui.filter = LocationFilter::new(Some("farm"), None);

    let commands = ui.dispatch(UiAction::Saved);
    assert_eq!(notices(&commands)[0].message, "location updated");
    assert!(commands.contains(&Command::Reload {
        filter: LocationFilter::new(Some("farm"), None),
        view: ViewMode::Preserve
    }));
    assert_eq!(ui.form_mode, FormMode::Create);
    assert_eq!(ui.open_modal, None);
}

#[test]
fn delete_needs_edit_mode_and_confirmation() {
    let mut ui = UiState::new();
    let commands = ui.dispatch(UiAction::DeleteRecord { confirmed: true });
    assert_eq!(notices(&commands)[0].level, NoticeLevel::Error);

    ui.dispatch(UiAction::EditLoaded(Box::new(LocationRecord::at(
        3,
        Some(1.0),
        Some(1.0),
    ))));
    assert!(ui
        .dispatch(UiAction::DeleteRecord { confirmed: false })
        .is_empty());
    assert_eq!(
        ui.dispatch(UiAction::DeleteRecord { confirmed: true }),
        vec![Command::Delete(3)]
    );
}

#[test]
fn report_requires_confirmation_and_words_hidden_outcome() {
    let mut ui = UiState::new();
    assert!(ui
        .dispatch(UiAction::ReportRecord {
            id: 5,
            confirmed: false
        })
        .is_empty());
    assert_eq!(
        ui.dispatch(UiAction::ReportRecord {
            id: 5,
            confirmed: true
        }),
        vec![Command::Report(5)]
    );

    ui.dispatch(UiAction::DetailLoaded(5));
    let commands = ui.dispatch(UiAction::Reported(ReportOutcome::after_increment(5, 19, 20)));
    assert_eq!(
        notices(&commands)[0].message,
        "report received; this location is now hidden"
    );
    assert_eq!(ui.open_modal, None);
    assert_eq!(ui.detail_id, None);
}

#[test]
fn filter_apply_and_clear() {
    let mut ui = UiState::new();
    let filter = LocationFilter::new(None, Some("cedar"));
    let commands = ui.dispatch(UiAction::ApplyFilter(filter.clone()));
    assert_eq!(
        commands[0],
        Command::Reload {
            filter,
            view: ViewMode::Preserve
        }
    );

    let commands = ui.dispatch(UiAction::ClearFilter);
    assert!(ui.filter.is_empty());
    assert_eq!(
        commands[0],
        Command::Reload {
            filter: LocationFilter::default(),
            view: ViewMode::Preserve
        }
    );
}

#[test]
fn address_search_flow() {
    let mut ui = UiState::new();
    let commands = ui.dispatch(UiAction::SearchAddress("   ".to_string()));
    assert_eq!(notices(&commands)[0].level, NoticeLevel::Error);

    assert_eq!(
        ui.dispatch(UiAction::SearchAddress(" Nagano ".to_string())),
        vec![Command::Geocode("Nagano".to_string())]
    );

    ui.dispatch(UiAction::GeocodeResults(vec![AddressCandidate {
        display_name: "Nagano, Japan".to_string(),
        position: Coordinates::new(36.648_6, 138.194_2).unwrap(),
    }]));
    assert_eq!(ui.candidates.len(), 1);

    let commands = ui.dispatch(UiAction::PickCandidate(3));
    assert_eq!(notices(&commands)[0].level, NoticeLevel::Error);

    ui.dispatch(UiAction::PickCandidate(0));
    assert_eq!(ui.address_query, "Nagano, Japan");
    assert_eq!(ui.form.latitude, "36.648600");
    assert!(ui.candidates.is_empty());
}

#[test]
fn focus_closes_detail_and_collapses_list() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::ToggleList);
    assert!(!ui.list_collapsed);
    ui.dispatch(UiAction::DetailLoaded(8));

    assert_eq!(ui.dispatch(UiAction::FocusRecord(8)), vec![Command::Focus(8)]);
    assert!(ui.list_collapsed);
    assert_eq!(ui.open_modal, None);
}

#[test]
fn closing_an_unrelated_modal_keeps_current_one() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::OpenHelp);
    ui.dispatch(UiAction::CloseContact);
    assert_eq!(ui.open_modal, Some(Modal::Help));
    ui.dispatch(UiAction::CloseHelp);
    assert_eq!(ui.open_modal, None);
}

#[test]
fn contact_flow() {
    let mut ui = UiState::new();
    ui.dispatch(UiAction::OpenContact);
    let bad = ui.dispatch_at(UiAction::SubmitContact(ContactForm::default()), now());
    assert_eq!(notices(&bad)[0].message, "fill in every field");

    let form = ContactForm {
        name: "Sato".to_string(),
        email: "sato@example.com".to_string(),
        message: "Hi".to_string(),
    };
    let commands = ui.dispatch_at(UiAction::SubmitContact(form), now());
    assert!(matches!(commands.as_slice(), [Command::SendContact(m)] if m.created_at == now()));

    ui.dispatch(UiAction::ContactSent);
    assert_eq!(ui.open_modal, None);
}

#[test]
fn request_failure_becomes_error_notice() {
    let mut ui = UiState::new();
    let commands = ui.dispatch(UiAction::RequestFailed(Operation::Geocode));
    let notice = notices(&commands)[0];
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "address search failed");
}
