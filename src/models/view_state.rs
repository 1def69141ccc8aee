//! Admin dashboard view state.
//!
//! The dashboard's view mode, open modal and selected booking live in one
//! value that only changes through [`reduce`]. The admin page posts actions
//! and renders whatever state comes back.

use serde::{Deserialize, Serialize};

use super::BookingStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Calendar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    BookingDetails { booking_id: String },
    Reschedule { booking_id: String },
    ConfirmCancel { booking_id: String },
    NewBooking,
}

impl Modal {
    fn booking_id(&self) -> Option<&str> {
        match self {
            Modal::BookingDetails { booking_id }
            | Modal::Reschedule { booking_id }
            | Modal::ConfirmCancel { booking_id } => Some(booking_id),
            Modal::NewBooking => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ViewState {
    pub mode: ViewMode,
    pub modal: Option<Modal>,
    pub selected_booking: Option<String>,
    pub status_filter: Option<BookingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewAction {
    SetMode { mode: ViewMode },
    SelectBooking { booking_id: String },
    ClearSelection,
    OpenModal { modal: Modal },
    CloseModal,
    FilterStatus { status: Option<BookingStatus> },
    /// A booking left the active set (archived or deleted).
    BookingRemoved { booking_id: String },
}

pub fn reduce(state: ViewState, action: ViewAction) -> ViewState {
    match action {
        ViewAction::SetMode { mode } => ViewState { mode, ..state },
        ViewAction::SelectBooking { booking_id } => ViewState {
            selected_booking: Some(booking_id),
            ..state
        },
        ViewAction::ClearSelection => ViewState {
            selected_booking: None,
            modal: None,
            ..state
        },
        ViewAction::OpenModal { modal } => {
            // Opening a booking-specific modal also selects that booking
            let selected_booking = modal
                .booking_id()
                .map(str::to_string)
                .or(state.selected_booking);
            ViewState {
                modal: Some(modal),
                selected_booking,
                ..state
            }
        }
        ViewAction::CloseModal => ViewState {
            modal: None,
            ..state
        },
        ViewAction::FilterStatus { status } => ViewState {
            status_filter: status,
            ..state
        },
        ViewAction::BookingRemoved { booking_id } => {
            let was_selected = state.selected_booking.as_deref() == Some(booking_id.as_str());
            let modal_targets =
                state.modal.as_ref().and_then(Modal::booking_id) == Some(booking_id.as_str());
            ViewState {
                selected_booking: if was_selected {
                    None
                } else {
                    state.selected_booking
                },
                modal: if modal_targets { None } else { state.modal },
                ..state
            }
        }
    }
}
