use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::admin::{check_auth, require_setup};
use crate::db::queries::{self, BookingFilter};
use crate::errors::AppError;
use crate::models::booking::{parse_date, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use crate::models::{ArchivedBooking, Booking, BookingAction, BookingStatus, NewBooking};
use crate::services::{bookings, calendar};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    date: String,
    time: String,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    service_id: String,
    staff_id: Option<String>,
    status: BookingStatus,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived_at: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            date: b.date.format(DATE_FORMAT).to_string(),
            time: b.time.format(TIME_FORMAT).to_string(),
            customer_name: b.customer_name,
            customer_email: b.customer_email,
            customer_phone: b.customer_phone,
            service_id: b.service_id,
            staff_id: b.staff_id,
            status: b.status,
            notes: b.notes,
            created_at: b.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: b.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            archived_at: None,
        }
    }
}

impl From<ArchivedBooking> for BookingResponse {
    fn from(a: ArchivedBooking) -> Self {
        let archived_at = a.archived_at.format(TIMESTAMP_FORMAT).to_string();
        Self {
            archived_at: Some(archived_at),
            ..BookingResponse::from(a.booking)
        }
    }
}

fn date_param(raw: Option<&str>, name: &str) -> Result<Option<chrono::NaiveDate>, AppError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("unparseable {name} {s:?}"))),
    }
}

const DEFAULT_PAGE: i64 = 100;
const MAX_PAGE: i64 = 500;

fn page_limit(raw: Option<i64>) -> i64 {
    raw.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => Some(
            BookingStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status {s:?}")))?,
        ),
    };
    let filter = BookingFilter {
        status,
        from: date_param(query.from.as_deref(), "from")?,
        to: date_param(query.to.as_deref(), "to")?,
        limit: Some(page_limit(query.limit)),
    };

    let bookings = {
        let db = state.db();
        queries::list_bookings(&db, &filter)?
    };

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// POST /api/admin/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewBooking>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let booking = bookings::create_booking(&state, body)?;
    Ok(Json(booking.into()))
}

// GET /api/admin/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = {
        let db = state.db();
        queries::get_booking_by_id(&db, &id)?
    };
    booking
        .map(|b| Json(b.into()))
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

async fn booking_action(
    state: Arc<AppState>,
    headers: HeaderMap,
    id: String,
    action: BookingAction,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let booking = bookings::apply_action(&state, &id, action).await?;
    Ok(Json(booking.into()))
}

// POST /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    booking_action(state, headers, id, BookingAction::Confirm).await
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    booking_action(state, headers, id, BookingAction::Cancel).await
}

// POST /api/admin/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    booking_action(state, headers, id, BookingAction::Complete).await
}

// POST /api/admin/bookings/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: Option<String>,
    pub time: Option<String>,
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let booking =
        bookings::reschedule(&state, &id, body.date.as_deref(), body.time.as_deref()).await?;
    Ok(Json(booking.into()))
}

// DELETE /api/admin/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    bookings::delete_booking(&state, &id)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/admin/calendar
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn calendar_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<BTreeMap<String, Vec<BookingResponse>>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let today = state.config.business_now().date();
    let from = date_param(query.from.as_deref(), "from")?.unwrap_or(today);
    let to = date_param(query.to.as_deref(), "to")?.unwrap_or(from + chrono::Duration::days(6));
    if to < from {
        return Err(AppError::BadRequest("`to` is before `from`".to_string()));
    }

    let bookings = {
        let db = state.db();
        queries::list_bookings(
            &db,
            &BookingFilter {
                from: Some(from),
                to: Some(to),
                ..Default::default()
            },
        )?
    };

    let days = calendar::group_by_day(bookings)
        .into_iter()
        .map(|(date, day)| {
            (
                date.format(DATE_FORMAT).to_string(),
                day.into_iter().map(BookingResponse::from).collect(),
            )
        })
        .collect();
    Ok(Json(days))
}

// GET /api/admin/archive
#[derive(Deserialize)]
pub struct ArchiveQuery {
    pub limit: Option<i64>,
}

pub async fn list_archive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ArchiveQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let archived = {
        let db = state.db();
        queries::list_archived(&db, page_limit(query.limit))?
    };
    Ok(Json(archived.into_iter().map(BookingResponse::from).collect()))
}
