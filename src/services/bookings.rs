use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::booking::{parse_date, parse_time};
use crate::models::{Booking, BookingAction, BookingStatus, NewBooking};
use crate::services::emails::{self, EmailKind};
use crate::services::lifecycle::next_status;
use crate::state::AppState;

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidBooking(format!("missing {field}")))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns raw request fields into a pending booking. Rejects missing or
/// unparseable fields before anything touches the store.
pub fn validate_new_booking(input: NewBooking, created_at: NaiveDateTime) -> Result<Booking, AppError> {
    let date_str = required(&input.date, "date")?;
    let time_str = required(&input.time, "time")?;
    let date = parse_date(date_str)
        .ok_or_else(|| AppError::InvalidBooking(format!("unparseable date {date_str:?}")))?;
    let time = parse_time(time_str)
        .ok_or_else(|| AppError::InvalidBooking(format!("unparseable time {time_str:?}")))?;

    let customer_name = required(&input.customer_name, "customer_name")?.to_string();
    let customer_email = required(&input.customer_email, "customer_email")?.to_string();
    if !customer_email.contains('@') {
        return Err(AppError::InvalidBooking(format!(
            "invalid customer_email {customer_email:?}"
        )));
    }
    let service_id = required(&input.service_id, "service_id")?.to_string();

    Ok(Booking {
        id: uuid::Uuid::new_v4().to_string(),
        date,
        time,
        customer_name,
        customer_email,
        customer_phone: optional(input.customer_phone),
        service_id,
        staff_id: optional(input.staff_id),
        status: BookingStatus::Pending,
        notes: optional(input.notes),
        created_at,
        updated_at: created_at,
    })
}

pub fn create_booking(state: &Arc<AppState>, input: NewBooking) -> Result<Booking, AppError> {
    let booking = validate_new_booking(input, Utc::now().naive_utc())?;

    let db = state.db();
    match queries::get_service(&db, &booking.service_id)? {
        Some(service) if service.active => {}
        Some(_) => {
            return Err(AppError::InvalidBooking(format!(
                "service {} is not offered",
                booking.service_id
            )))
        }
        None => {
            return Err(AppError::InvalidBooking(format!(
                "unknown service {}",
                booking.service_id
            )))
        }
    }
    if let Some(staff_id) = &booking.staff_id {
        match queries::get_staff(&db, staff_id)? {
            Some(staff) if staff.active => {}
            _ => {
                return Err(AppError::InvalidBooking(format!(
                    "unknown or inactive staff {staff_id}"
                )))
            }
        }
    }

    queries::insert_booking(&db, &booking)?;
    tracing::info!(id = %booking.id, date = %booking.date, time = %booking.time, "booking created");
    Ok(booking)
}

/// Reads, checks and writes one transition under a single connection guard.
/// The write only lands if the row still holds the status it was checked
/// against; otherwise the fresh status is reported as the conflict.
fn commit_transition(
    conn: &Connection,
    id: &str,
    action: BookingAction,
    new_slot: Option<(NaiveDate, NaiveTime)>,
) -> Result<(Booking, Booking), AppError> {
    let not_found = || AppError::NotFound(format!("booking {id}"));

    let current = queries::get_booking_by_id(conn, id)?.ok_or_else(not_found)?;
    let status = next_status(current.status, action)?;

    let written = match new_slot {
        None => queries::update_booking_status(conn, id, current.status, status)?,
        Some((date, time)) => {
            queries::reschedule_booking(conn, id, current.status, date, time, status)?
        }
    };
    if !written {
        return match queries::get_booking_by_id(conn, id)? {
            Some(now) => Err(AppError::InvalidTransition {
                from: now.status,
                action,
            }),
            None => Err(not_found()),
        };
    }

    let updated = queries::get_booking_by_id(conn, id)?.ok_or_else(not_found)?;
    Ok((current, updated))
}

/// Runs a confirm/cancel/complete command through the transition table,
/// persists it and emails the customer where the action calls for it.
pub async fn apply_action(
    state: &Arc<AppState>,
    id: &str,
    action: BookingAction,
) -> Result<Booking, AppError> {
    if action == BookingAction::Reschedule {
        return Err(AppError::InvalidBooking(
            "reschedule requires a new date and time".to_string(),
        ));
    }

    let (_, booking) = {
        let db = state.db();
        commit_transition(&db, id, action, None)?
    };

    tracing::info!(id = %id, action = %action, status = %booking.status, "booking status changed");

    let email = match action {
        BookingAction::Confirm => Some(EmailKind::Confirmed),
        BookingAction::Cancel => Some(EmailKind::Cancelled),
        BookingAction::Complete | BookingAction::Reschedule => None,
    };
    if let Some(kind) = email {
        notify_customer(state, kind, &booking).await;
    }

    Ok(booking)
}

pub async fn reschedule(
    state: &Arc<AppState>,
    id: &str,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<Booking, AppError> {
    let date_str = date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::InvalidBooking("missing date".to_string()))?;
    let time_str = time
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InvalidBooking("missing time".to_string()))?;
    let date = parse_date(date_str)
        .ok_or_else(|| AppError::InvalidBooking(format!("unparseable date {date_str:?}")))?;
    let time = parse_time(time_str)
        .ok_or_else(|| AppError::InvalidBooking(format!("unparseable time {time_str:?}")))?;

    let (current, booking) = {
        let db = state.db();
        commit_transition(&db, id, BookingAction::Reschedule, Some((date, time)))?
    };

    tracing::info!(
        id = %id,
        from = %current.scheduled_at(),
        to = %booking.scheduled_at(),
        "booking rescheduled"
    );
    notify_customer(state, EmailKind::Rescheduled, &booking).await;

    Ok(booking)
}

pub fn delete_booking(state: &Arc<AppState>, id: &str) -> Result<(), AppError> {
    let db = state.db();
    if queries::delete_booking(&db, id)? {
        tracing::info!(id = %id, "booking deleted");
        Ok(())
    } else {
        Err(AppError::NotFound(format!("booking {id}")))
    }
}

fn business_name(state: &AppState) -> String {
    let db = state.db();
    queries::get_settings(&db)
        .ok()
        .map(|s| s.business_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| state.config.business_name.clone())
}

/// Sends one customer email. Failures are logged and swallowed: the status
/// change that triggered the email stands either way.
pub async fn notify_customer(state: &Arc<AppState>, kind: EmailKind, booking: &Booking) -> bool {
    let service_name = {
        let db = state.db();
        queries::get_service(&db, &booking.service_id)
            .ok()
            .flatten()
            .map(|s| s.name)
            .unwrap_or_else(|| "your appointment".to_string())
    };
    let email = emails::render(kind, booking, &service_name, &business_name(state));

    match state
        .notifier
        .send(&booking.customer_email, &email.subject, &email.html)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            let err = AppError::NotificationFailure(format!("{e:#}"));
            tracing::error!(id = %booking.id, kind = ?kind, error = %err, "failed to notify customer");
            false
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderReport {
    pub date: String,
    pub sent: usize,
    pub failed: usize,
}

/// Emails every confirmed booking on `date`, one at a time.
pub async fn send_reminders(state: &Arc<AppState>, date: NaiveDate) -> Result<ReminderReport, AppError> {
    let bookings = {
        let db = state.db();
        queries::list_bookings(
            &db,
            &queries::BookingFilter {
                status: Some(BookingStatus::Confirmed),
                from: Some(date),
                to: Some(date),
                limit: None,
            },
        )?
    };

    let mut report = ReminderReport {
        date: date.to_string(),
        ..Default::default()
    };
    for booking in &bookings {
        if notify_customer(state, EmailKind::Reminder, booking).await {
            report.sent += 1;
        } else {
            report.failed += 1;
        }
    }

    tracing::info!(date = %date, sent = report.sent, failed = report.failed, "reminders sent");
    Ok(report)
}
