//! Controller that connects the UI state machine to the HTTP clients and the
//! text map.
//!
//! [`App::dispatch`] feeds an action to [`UiState`], runs each resulting
//! [`Command`], and feeds the completion action of every command back in
//! until the queue drains.

use std::collections::VecDeque;

use firewood_api::{LocationsClient, NominatimClient};
use firewood_core::{
    AppConfig, Bounds, Command, DetailView, ListCard, LoadOutcome, LocationFilter, LocationRecord,
    MapState, Notice, NoticeLevel, Operation, UiAction, UiState, ViewMode,
};

use crate::surface::{MarkerId, TextMap};

pub(crate) struct App {
    locations: LocationsClient,
    geocoder: NominatimClient,
    map: MapState<MarkerId>,
    surface: TextMap,
    ui: UiState,
    detail: Option<LocationRecord>,
    notices: Vec<Notice>,
}

impl App {
    pub(crate) fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            locations: LocationsClient::new(config)?,
            geocoder: NominatimClient::new(config)?,
            map: MapState::new(),
            surface: TextMap::new(config.default_center, config.default_zoom),
            ui: UiState::new(),
            detail: None,
            notices: Vec::new(),
        })
    }

    /// Performs the initial load and fits the view to the markers.
    pub(crate) async fn startup(&mut self) {
        let command = self.ui.startup();
        self.run_commands(VecDeque::from([command])).await;
    }

    /// Loads with `filter`, or runs the plain startup load when it is empty.
    pub(crate) async fn load(&mut self, filter: LocationFilter) {
        if filter.is_empty() {
            self.startup().await;
        } else {
            self.dispatch(UiAction::ApplyFilter(filter)).await;
        }
    }

    pub(crate) async fn dispatch(&mut self, action: UiAction) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            tracing::debug!(?action, "dispatching UI action");
            let commands = self.ui.dispatch(action);
            let follow_ups = self.run_commands(commands.into()).await;
            pending.extend(follow_ups);
        }
    }

    async fn run_commands(&mut self, mut commands: VecDeque<Command>) -> Vec<UiAction> {
        let mut follow_ups = Vec::new();
        while let Some(command) = commands.pop_front() {
            if let Some(action) = self.execute(command).await {
                follow_ups.push(action);
            }
        }
        follow_ups
    }

    /// Runs one command; returns the action that reports its completion.
    async fn execute(&mut self, command: Command) -> Option<UiAction> {
        match command {
            Command::Reload { filter, view } => self.reload(&filter, view).await,
            Command::FetchDetail(id) => match self.locations.fetch_location(id).await {
                Ok(record) => {
                    self.detail = Some(record);
                    Some(UiAction::DetailLoaded(id))
                }
                Err(e) => failed(Operation::Detail, &e),
            },
            Command::LoadForEdit(id) => match self.locations.fetch_location(id).await {
                Ok(record) => Some(UiAction::EditLoaded(Box::new(record))),
                Err(e) => failed(Operation::LoadForEdit, &e),
            },
            Command::Create(input) => match self.locations.add_location(&input).await {
                Ok(()) => Some(UiAction::Saved),
                Err(e) => failed(Operation::Create, &e),
            },
            Command::Update { id, input } => {
                match self.locations.update_location(id, &input).await {
                    Ok(()) => Some(UiAction::Saved),
                    Err(e) => failed(Operation::Update, &e),
                }
            }
            Command::Delete(id) => match self.locations.delete_location(id).await {
                Ok(()) => Some(UiAction::Deleted),
                Err(e) => failed(Operation::Delete, &e),
            },
            Command::Report(id) => match self.locations.report_location(id).await {
                Ok(outcome) => Some(UiAction::Reported(outcome)),
                Err(e) => failed(Operation::Report, &e),
            },
            Command::Geocode(query) => match self.geocoder.search(&query).await {
                Ok(candidates) => Some(UiAction::GeocodeResults(candidates)),
                Err(e) => failed(Operation::Geocode, &e),
            },
            Command::SendContact(message) => match self.locations.send_contact(&message).await {
                Ok(()) => Some(UiAction::ContactSent),
                Err(e) => failed(Operation::Contact, &e),
            },
            Command::Focus(id) => {
                if !self.map.focus(id, &mut self.surface) {
                    self.notify(Notice {
                        level: NoticeLevel::Error,
                        message: format!("location {id} is not on the map"),
                    });
                }
                None
            }
            Command::Notify(notice) => {
                self.notify(notice);
                None
            }
        }
    }

    async fn reload(&mut self, filter: &LocationFilter, view: ViewMode) -> Option<UiAction> {
        let ticket = self.map.begin_load();
        match self.locations.fetch_locations(filter).await {
            Ok(records) => {
                match self
                    .map
                    .finish_load(ticket, records, filter, view, &mut self.surface)
                {
                    LoadOutcome::Applied(redraw) => tracing::info!(
                        records = redraw.records,
                        markers = redraw.markers,
                        visible = redraw.visible,
                        "locations loaded"
                    ),
                    LoadOutcome::Stale {
                        generation,
                        current,
                    } => tracing::debug!(generation, current, "load superseded"),
                }
                None
            }
            Err(e) => failed(Operation::Load, &e),
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::debug!(message = %notice.message, "notice");
            }
        }
        eprintln!("{}", crate::render::notice(&notice));
        self.notices.push(notice);
    }

    pub(crate) fn set_viewport(&mut self, bounds: Bounds) {
        let visible = self.map.set_viewport(bounds).len();
        tracing::debug!(visible, "viewport updated");
    }

    pub(crate) fn list_cards(&self) -> Vec<ListCard> {
        self.map.list_cards()
    }

    pub(crate) fn detail_view(&self) -> Option<DetailView> {
        let id = self.ui.detail_id?;
        self.detail
            .as_ref()
            .filter(|r| r.id == id)
            .map(DetailView::from_record)
    }

    pub(crate) fn map(&self) -> &MapState<MarkerId> {
        &self.map
    }

    pub(crate) fn surface(&self) -> &TextMap {
        &self.surface
    }

    pub(crate) fn ui(&self) -> &UiState {
        &self.ui
    }

    pub(crate) fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Turns the first error notice into the process result.
    pub(crate) fn finish(&self) -> anyhow::Result<()> {
        match self
            .notices
            .iter()
            .find(|n| n.level == NoticeLevel::Error)
        {
            Some(notice) => Err(anyhow::anyhow!(notice.message.clone())),
            None => Ok(()),
        }
    }
}

fn failed(operation: Operation, err: &firewood_api::ApiError) -> Option<UiAction> {
    tracing::warn!(?operation, error = %err, "request failed");
    Some(UiAction::RequestFailed(operation))
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
