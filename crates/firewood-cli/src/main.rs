mod app;
mod render;
mod surface;

use clap::{Args, Parser, Subcommand};
use firewood_core::{
    Bounds, ContactForm, Coordinates, FormMode, LocationFilter, LocationForm, LocationId, UiAction,
};
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "firewood-cli")]
#[command(about = "Browse and maintain the firewood sale-location map")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List locations in view
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Viewport as south,west,north,east
        #[arg(long, value_parser = parse_bounds, allow_hyphen_values = true)]
        bounds: Option<Bounds>,
    },
    /// Show map markers and their popups
    Markers {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print popup HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Show the details of one location
    Show {
        id: LocationId,
        #[arg(long)]
        html: bool,
    },
    /// Centre the map on a location and open its marker popup
    Focus { id: LocationId },
    /// Add a location
    Add {
        #[command(flatten)]
        fields: LocationArgs,
        /// Take coordinates from the first address search hit
        #[arg(long)]
        address: Option<String>,
        /// Take coordinates and name from an existing marker
        #[arg(long, conflicts_with = "address")]
        at_marker: Option<LocationId>,
    },
    /// Edit a location; omitted fields keep their stored value
    Edit {
        id: LocationId,
        #[command(flatten)]
        fields: LocationArgs,
    },
    /// Delete a location
    Delete {
        id: LocationId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Report a location as wrong or closed
    Report {
        id: LocationId,
        /// Confirm the report
        #[arg(long)]
        yes: bool,
    },
    /// Search for an address
    Geocode { query: String },
    /// Send a message to the site operators
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Case-insensitive match on the location name
    #[arg(long)]
    search: Option<String>,
    /// Case-insensitive match on the wood type
    #[arg(long)]
    wood_type: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> LocationFilter {
        LocationFilter::new(self.search.as_deref(), self.wood_type.as_deref())
    }
}

#[derive(Debug, Default, Args)]
struct LocationArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    wood_type: Option<String>,
    /// Price in yen
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    lng: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    sales_period: Option<String>,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl LocationArgs {
    /// Overwrites the form fields that were given on the command line.
    fn apply(self, form: &mut LocationForm) {
        let pairs = [
            (self.name, &mut form.location_name),
            (self.wood_type, &mut form.wood_type),
            (self.price, &mut form.price),
            (self.amount, &mut form.amount),
            (self.lat, &mut form.latitude),
            (self.lng, &mut form.longitude),
            (self.notes, &mut form.notes),
            (self.sales_period, &mut form.sales_period),
            (self.contact, &mut form.contact_info),
            (self.description, &mut form.description),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

fn parse_bounds(raw: &str) -> Result<Bounds, String> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<Result<_, _>>()?;
    let &[south, west, north, east] = parts.as_slice() else {
        return Err("expected south,west,north,east".to_owned());
    };
    let corner = |lat: f64, lng: f64| {
        Coordinates::new(lat, lng).ok_or_else(|| format!("{lat},{lng} is not a valid position"))
    };
    Ok(Bounds::from_corners(
        corner(south, west)?,
        corner(north, east)?,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = firewood_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let mut app = App::new(&config)?;
    match cli.command {
        None => {
            app.startup().await;
            println!(
                "{} locations, {} markers",
                app.map().records().len(),
                app.map().markers().len()
            );
            print!("{}", render::view(app.surface()));
        }
        Some(Commands::List { filter, bounds }) => {
            app.load(filter.to_filter()).await;
            if let Some(bounds) = bounds {
                app.set_viewport(bounds);
            }
            print!("{}", render::list_table(&app.list_cards()));
        }
        Some(Commands::Markers { filter, html }) => {
            app.load(filter.to_filter()).await;
            print!("{}", render::markers(app.map(), html));
        }
        Some(Commands::Show { id, html }) => {
            app.dispatch(UiAction::ViewDetails(id)).await;
            if let Some(view) = app.detail_view() {
                print!("{}", render::detail(&view, html));
            }
        }
        Some(Commands::Focus { id }) => {
            app.startup().await;
            app.dispatch(UiAction::FocusRecord(id)).await;
            print!("{}", render::view(app.surface()));
        }
        Some(Commands::Add {
            fields,
            address,
            at_marker,
        }) => run_add(&mut app, fields, address, at_marker).await?,
        Some(Commands::Edit { id, fields }) => {
            app.dispatch(UiAction::OpenEditForm(id)).await;
            if app.ui().form_mode == FormMode::Edit(id) {
                let mut form = app.ui().form.clone();
                fields.apply(&mut form);
                app.dispatch(UiAction::UpdateForm(Box::new(form))).await;
                app.dispatch(UiAction::SubmitForm).await;
            }
        }
        Some(Commands::Delete { id, yes }) => {
            app.dispatch(UiAction::OpenEditForm(id)).await;
            if app.ui().form_mode == FormMode::Edit(id) {
                app.dispatch(UiAction::DeleteRecord { confirmed: yes }).await;
                if !yes {
                    println!("not deleted; pass --yes to confirm");
                }
            }
        }
        Some(Commands::Report { id, yes }) => {
            app.dispatch(UiAction::ReportRecord { id, confirmed: yes })
                .await;
            if !yes {
                println!("not reported; pass --yes to confirm");
            }
        }
        Some(Commands::Geocode { query }) => {
            app.dispatch(UiAction::SearchAddress(query)).await;
            print!("{}", render::candidates(&app.ui().candidates));
        }
        Some(Commands::Contact {
            name,
            email,
            message,
        }) => {
            app.dispatch(UiAction::OpenContact).await;
            app.dispatch(UiAction::SubmitContact(ContactForm {
                name,
                email,
                message,
            }))
            .await;
        }
    }

    app.finish()
}

/// Fills the create form from the arguments, optionally picks a position
/// from an address search or an existing marker, then submits.
async fn run_add(
    app: &mut App,
    fields: LocationArgs,
    address: Option<String>,
    at_marker: Option<LocationId>,
) -> anyhow::Result<()> {
    app.dispatch(UiAction::OpenAddForm).await;
    let mut form = LocationForm::default();
    fields.apply(&mut form);
    app.dispatch(UiAction::UpdateForm(Box::new(form))).await;

    if let Some(address) = address {
        app.dispatch(UiAction::SearchAddress(address)).await;
        if app.ui().candidates.is_empty() {
            return app.finish();
        }
        app.dispatch(UiAction::PickCandidate(0)).await;
    }

    if let Some(marker_id) = at_marker {
        app.startup().await;
        let handoff = app
            .map()
            .find_marker(marker_id)
            .map(|entry| entry.popup.add_here.clone())
            .ok_or_else(|| anyhow::anyhow!("no marker with id {marker_id}"))?;
        app.dispatch(UiAction::StartMapSelection).await;
        app.dispatch(UiAction::MarkerClicked(handoff)).await;
    }

    app.dispatch(UiAction::SubmitForm).await;
    Ok(())
}

#[cfg(test)]
mod tests;
