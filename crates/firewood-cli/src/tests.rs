use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["firewood-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_list_with_filters_and_bounds() {
    let cli = Cli::try_parse_from([
        "firewood-cli",
        "list",
        "--search",
        "farm",
        "--wood-type",
        "oak",
        "--bounds",
        "34,135,36,140",
    ])
    .expect("expected valid cli args");

    let Some(Commands::List { filter, bounds }) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(filter.to_filter(), LocationFilter::new(Some("farm"), Some("oak")));
    let bounds = bounds.expect("bounds should parse");
    assert_eq!(bounds.south_west, Coordinates::new(34.0, 135.0).unwrap());
    assert_eq!(bounds.north_east, Coordinates::new(36.0, 140.0).unwrap());
}

#[test]
fn bounds_accept_negative_values_and_any_corner_order() {
    let bounds = parse_bounds("-10, 20, -30, 5").unwrap();
    assert_eq!(bounds.south_west, Coordinates::new(-30.0, 5.0).unwrap());
    assert_eq!(bounds.north_east, Coordinates::new(-10.0, 20.0).unwrap());
}

#[test]
fn bounds_reject_bad_input() {
    assert!(parse_bounds("1,2,3").is_err());
    assert!(parse_bounds("a,b,c,d").is_err());
    assert!(parse_bounds("95,0,10,10").is_err());
}

#[test]
fn parses_markers_html_flag() {
    let cli = Cli::try_parse_from(["firewood-cli", "markers", "--html"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Markers { html: true, .. })
    ));
}

#[test]
fn parses_show_command() {
    let cli = Cli::try_parse_from(["firewood-cli", "show", "42"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Show {
            id: 42,
            html: false
        })
    ));
}

#[test]
fn parses_add_with_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "firewood-cli",
        "add",
        "--name",
        "Southern stall",
        "--wood-type",
        "Gum",
        "--price",
        "900",
        "--lat",
        "-33.86",
        "--lng",
        "151.2",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Add {
        fields,
        address: None,
        at_marker: None,
    }) = cli.command
    else {
        panic!("expected add command");
    };
    let mut form = LocationForm::default();
    fields.apply(&mut form);
    assert_eq!(form.latitude, "-33.86");
    assert_eq!(form.location_name, "Southern stall");
    assert!(form.notes.is_empty());
}

#[test]
fn add_rejects_address_with_marker() {
    let result = Cli::try_parse_from([
        "firewood-cli",
        "add",
        "--address",
        "Nagano",
        "--at-marker",
        "3",
    ]);
    assert!(result.is_err());
}

#[test]
fn edit_keeps_fields_that_are_not_given() {
    let cli = Cli::try_parse_from(["firewood-cli", "edit", "7", "--price", "1200"])
        .expect("expected valid cli args");
    let Some(Commands::Edit { id, fields }) = cli.command else {
        panic!("expected edit command");
    };
    assert_eq!(id, 7);

    let mut form = LocationForm {
        location_name: "Mori".to_owned(),
        price: "800".to_owned(),
        ..LocationForm::default()
    };
    fields.apply(&mut form);
    assert_eq!(form.location_name, "Mori");
    assert_eq!(form.price, "1200");
}

#[test]
fn delete_and_report_default_to_unconfirmed() {
    let cli = Cli::try_parse_from(["firewood-cli", "delete", "5"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Delete { id: 5, yes: false })
    ));

    let cli = Cli::try_parse_from(["firewood-cli", "report", "5", "--yes"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Report { id: 5, yes: true })
    ));
}

#[test]
fn contact_requires_all_fields() {
    assert!(Cli::try_parse_from(["firewood-cli", "contact", "--name", "Sato"]).is_err());
    let cli = Cli::try_parse_from([
        "firewood-cli",
        "contact",
        "--name",
        "Sato",
        "--email",
        "sato@example.com",
        "--message",
        "hello",
    ])
    .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Contact { .. })));
}
