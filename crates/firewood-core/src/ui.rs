//! UI state machine.
//!
//! Every user interaction and every completed request is a [`UiAction`].
//! [`UiState::dispatch`] updates the UI state and returns the [`Command`]s
//! the controller must run; the controller feeds each command's completion
//! back in as another action. Whether the form creates or edits a record is
//! carried by [`FormMode`], not by which handler happens to be attached.

use chrono::{DateTime, Utc};

use crate::form::{ContactForm, LocationForm};
use crate::geo::Coordinates;
use crate::popup::AddHereHandoff;
use crate::record::{
    AddressCandidate, ContactMessage, LocationFilter, LocationId, LocationInput, LocationRecord,
    ReportOutcome,
};
use crate::state::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    LocationForm,
    Detail,
    Help,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(LocationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A short message for the user (a toast in the browser UI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Request kinds, used to word failure notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Detail,
    LoadForEdit,
    Create,
    Update,
    Delete,
    Report,
    Geocode,
    Contact,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::Load => "failed to load locations",
            Operation::Detail => "failed to load location details",
            Operation::LoadForEdit => "failed to load the location for editing",
            Operation::Create => "failed to add the location",
            Operation::Update => "failed to update the location",
            Operation::Delete => "failed to delete the location",
            Operation::Report => "failed to send the report",
            Operation::Geocode => "address search failed",
            Operation::Contact => "failed to send the message",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    OpenAddForm,
    CloseForm,
    /// Replaces the form draft with what the user typed.
    UpdateForm(Box<LocationForm>),
    StartMapSelection,
    CancelMapSelection,
    MapClicked(Coordinates),
    MarkerClicked(AddHereHandoff),
    ViewDetails(LocationId),
    DetailLoaded(LocationId),
    CloseDetails,
    FocusRecord(LocationId),
    OpenEditForm(LocationId),
    EditLoaded(Box<LocationRecord>),
    SubmitForm,
    Saved,
    DeleteRecord { confirmed: bool },
    Deleted,
    ReportRecord { id: LocationId, confirmed: bool },
    Reported(ReportOutcome),
    ApplyFilter(LocationFilter),
    ClearFilter,
    Refresh,
    SearchAddress(String),
    GeocodeResults(Vec<AddressCandidate>),
    PickCandidate(usize),
    ToggleList,
    OpenHelp,
    CloseHelp,
    OpenContact,
    CloseContact,
    SubmitContact(ContactForm),
    ContactSent,
    RequestFailed(Operation),
}

/// Work the controller performs on behalf of the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Reload { filter: LocationFilter, view: ViewMode },
    FetchDetail(LocationId),
    LoadForEdit(LocationId),
    Create(LocationInput),
    Update { id: LocationId, input: LocationInput },
    Delete(LocationId),
    Report(LocationId),
    Geocode(String),
    SendContact(ContactMessage),
    Focus(LocationId),
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub open_modal: Option<Modal>,
    pub form_mode: FormMode,
    pub form: LocationForm,
    pub selecting: bool,
    pub list_collapsed: bool,
    pub filter: LocationFilter,
    pub detail_id: Option<LocationId>,
    pub address_query: String,
    pub candidates: Vec<AddressCandidate>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            open_modal: None,
            form_mode: FormMode::Create,
            form: LocationForm::default(),
            selecting: false,
            list_collapsed: true,
            filter: LocationFilter::default(),
            detail_id: None,
            address_query: String::new(),
            candidates: Vec::new(),
        }
    }
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Command that performs the first data load.
    #[must_use]
    pub fn startup(&self) -> Command {
        Command::Reload {
            filter: self.filter.clone(),
            view: ViewMode::FitToMarkers,
        }
    }

    pub fn dispatch(&mut self, action: UiAction) -> Vec<Command> {
        self.dispatch_at(action, Utc::now())
    }

    /// [`UiState::dispatch`] with an explicit clock for update timestamps.
    #[allow(clippy::too_many_lines)]
    pub fn dispatch_at(&mut self, action: UiAction, now: DateTime<Utc>) -> Vec<Command> {
        match action {
            UiAction::OpenAddForm => {
                self.reset_form();
                self.candidates.clear();
                self.open_modal = Some(Modal::LocationForm);
                Vec::new()
            }
            UiAction::CloseForm => {
                self.close(Modal::LocationForm);
                self.reset_form();
                Vec::new()
            }
            UiAction::UpdateForm(form) => {
                self.form = *form;
                Vec::new()
            }
            UiAction::StartMapSelection => {
                self.selecting = true;
                self.close(Modal::LocationForm);
                vec![notify(Notice::info("click a spot on the map"))]
            }
            UiAction::CancelMapSelection => {
                self.selecting = false;
                Vec::new()
            }
            UiAction::MapClicked(position) => {
                if !self.selecting {
                    return Vec::new();
                }
                self.form.set_position(position);
                self.finish_selection();
                let (lat, lng) = position.format(4);
                vec![notify(Notice::success(format!(
                    "picked coordinates ({lat}, {lng})"
                )))]
            }
            UiAction::MarkerClicked(handoff) => {
                if !self.selecting {
                    return Vec::new();
                }
                self.form.apply_handoff(&handoff);
                self.finish_selection();
                let (lat, lng) = handoff.position.format(4);
                vec![notify(Notice::success(format!(
                    "picked coordinates ({lat}, {lng}) and location name"
                )))]
            }
            UiAction::ViewDetails(id) => vec![Command::FetchDetail(id)],
            UiAction::DetailLoaded(id) => {
                self.detail_id = Some(id);
                self.open_modal = Some(Modal::Detail);
                Vec::new()
            }
            UiAction::CloseDetails => {
                self.close(Modal::Detail);
                Vec::new()
            }
            UiAction::FocusRecord(id) => {
                self.close(Modal::Detail);
                self.list_collapsed = true;
                vec![Command::Focus(id)]
            }
            UiAction::OpenEditForm(id) => vec![Command::LoadForEdit(id)],
            UiAction::EditLoaded(record) => {
                self.form = LocationForm::from_record(&record);
                self.form_mode = FormMode::Edit(record.id);
                self.open_modal = Some(Modal::LocationForm);
                Vec::new()
            }
            UiAction::SubmitForm => self.submit_form(now),
            UiAction::Saved => {
                let message = match self.form_mode {
                    FormMode::Create => "location added",
                    FormMode::Edit(_) => "location updated",
                };
                self.close(Modal::LocationForm);
                self.reset_form();
                vec![notify(Notice::success(message)), self.reload(ViewMode::Preserve)]
            }
            UiAction::DeleteRecord { confirmed } => match self.form_mode {
                FormMode::Edit(id) if confirmed => vec![Command::Delete(id)],
                FormMode::Edit(_) => Vec::new(),
                FormMode::Create => vec![notify(Notice::error("nothing to delete"))],
            },
            UiAction::Deleted => {
                self.close(Modal::LocationForm);
                self.reset_form();
                vec![
                    notify(Notice::success("location deleted")),
                    self.reload(ViewMode::Preserve),
                ]
            }
            UiAction::ReportRecord { id, confirmed } => {
                if confirmed {
                    vec![Command::Report(id)]
                } else {
                    Vec::new()
                }
            }
            UiAction::Reported(outcome) => {
                self.close(Modal::Detail);
                let message = if outcome.hidden {
                    "report received; this location is now hidden"
                } else {
                    "report received"
                };
                vec![notify(Notice::success(message)), self.reload(ViewMode::Preserve)]
            }
            UiAction::ApplyFilter(filter) => {
                self.filter = filter;
                vec![
                    self.reload(ViewMode::Preserve),
                    notify(Notice::success("filter applied")),
                ]
            }
            UiAction::ClearFilter => {
                self.filter = LocationFilter::default();
                vec![
                    self.reload(ViewMode::Preserve),
                    notify(Notice::info("filter cleared")),
                ]
            }
            UiAction::Refresh => vec![self.reload(ViewMode::FitToMarkers)],
            UiAction::SearchAddress(query) => {
                let query = query.trim();
                if query.is_empty() {
                    return vec![notify(Notice::error("enter an address"))];
                }
                self.address_query = query.to_owned();
                self.candidates.clear();
                vec![Command::Geocode(query.to_owned())]
            }
            UiAction::GeocodeResults(candidates) => {
                self.candidates = candidates;
                if self.candidates.is_empty() {
                    vec![notify(Notice::info("no matching addresses found"))]
                } else {
                    vec![notify(Notice::success(format!(
                        "found {} result(s)",
                        self.candidates.len()
                    )))]
                }
            }
            UiAction::PickCandidate(index) => {
                let Some(candidate) = self.candidates.get(index).cloned() else {
                    return vec![notify(Notice::error("no such search result"))];
                };
                self.form.set_position(candidate.position);
                self.address_query = candidate.display_name;
                self.candidates.clear();
                vec![notify(Notice::success("address selected"))]
            }
            UiAction::ToggleList => {
                self.list_collapsed = !self.list_collapsed;
                Vec::new()
            }
            UiAction::OpenHelp => {
                self.open_modal = Some(Modal::Help);
                Vec::new()
            }
            UiAction::CloseHelp => {
                self.close(Modal::Help);
                Vec::new()
            }
            UiAction::OpenContact => {
                self.open_modal = Some(Modal::Contact);
                Vec::new()
            }
            UiAction::CloseContact => {
                self.close(Modal::Contact);
                Vec::new()
            }
            UiAction::SubmitContact(form) => match form.validate(now) {
                Ok(message) => vec![Command::SendContact(message)],
                Err(e) => vec![notify(Notice::error(e.to_string()))],
            },
            UiAction::ContactSent => {
                self.close(Modal::Contact);
                vec![notify(Notice::success("message sent"))]
            }
            UiAction::RequestFailed(op) => vec![notify(Notice::error(op.failure_message()))],
        }
    }

    fn submit_form(&mut self, now: DateTime<Utc>) -> Vec<Command> {
        let validated = match self.form_mode {
            FormMode::Create => self.form.validate().map(Command::Create),
            FormMode::Edit(id) => self
                .form
                .validate_update(now)
                .map(|input| Command::Update { id, input }),
        };
        match validated {
            Ok(command) => vec![command],
            Err(e) => vec![notify(Notice::error(e.to_string()))],
        }
    }

    fn reload(&self, view: ViewMode) -> Command {
        Command::Reload {
            filter: self.filter.clone(),
            view,
        }
    }

    fn finish_selection(&mut self) {
        self.selecting = false;
        self.open_modal = Some(Modal::LocationForm);
    }

    fn reset_form(&mut self) {
        self.form = LocationForm::default();
        self.form_mode = FormMode::Create;
    }

    fn close(&mut self, modal: Modal) {
        if self.open_modal == Some(modal) {
            self.open_modal = None;
        }
        if modal == Modal::Detail {
            self.detail_id = None;
        }
    }
}

fn notify(notice: Notice) -> Command {
    Command::Notify(notice)
}

#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;
