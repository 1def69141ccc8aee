use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::booking::{parse_date, TIMESTAMP_FORMAT};
use crate::models::view_state::{reduce, ViewAction, ViewState};
use crate::services::bookings::{self, ReminderReport};
use crate::services::sweep::{self, SweepReport};
use crate::state::AppState;

static ADMIN_HTML: &str = include_str!("../web/admin.html");

pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

pub fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Mutations stay locked until the business has been set up.
pub fn require_setup(state: &AppState) -> Result<(), AppError> {
    let settings = {
        let db = state.db();
        queries::get_settings(&db)?
    };
    if settings.setup_complete {
        Ok(())
    } else {
        Err(AppError::SetupRequired)
    }
}

// GET /api/admin/setup
#[derive(Serialize)]
pub struct SetupResponse {
    setup_complete: bool,
    business_name: String,
    setup_completed_at: Option<String>,
}

pub async fn get_setup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SetupResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let settings = {
        let db = state.db();
        queries::get_settings(&db)?
    };
    Ok(Json(SetupResponse {
        setup_complete: settings.setup_complete,
        business_name: settings.business_name,
        setup_completed_at: settings
            .setup_completed_at
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
    }))
}

// POST /api/admin/setup
#[derive(Deserialize)]
pub struct SetupRequest {
    pub business_name: String,
}

pub async fn complete_setup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SetupRequest>,
) -> Result<Json<SetupResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let name = body.business_name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("business_name is required".to_string()));
    }

    let settings = {
        let db = state.db();
        queries::complete_setup(&db, name)?
    };
    tracing::info!(business_name = %settings.business_name, "setup completed");

    Ok(Json(SetupResponse {
        setup_complete: settings.setup_complete,
        business_name: settings.business_name,
        setup_completed_at: settings
            .setup_completed_at
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
    }))
}

// GET /api/admin/status
#[derive(Serialize)]
pub struct StatusResponse {
    setup_complete: bool,
    today: String,
    pending_total: i64,
    pending_today: i64,
    upcoming_confirmed: i64,
    completed_total: i64,
    archived_total: i64,
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let now = state.config.business_now();
    let (settings, stats) = {
        let db = state.db();
        (queries::get_settings(&db)?, queries::get_dashboard_stats(&db, now)?)
    };

    Ok(Json(StatusResponse {
        setup_complete: settings.setup_complete,
        today: now.date().to_string(),
        pending_total: stats.pending_total,
        pending_today: stats.pending_today,
        upcoming_confirmed: stats.upcoming_confirmed,
        completed_total: stats.completed_total,
        archived_total: stats.archived_total,
    }))
}

// POST /api/admin/sweep
pub async fn run_sweep(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SweepReport>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    Ok(Json(sweep::run_for_state(&state)?))
}

// POST /api/admin/reminders
#[derive(Deserialize)]
pub struct RemindersRequest {
    /// Defaults to tomorrow in business time.
    pub date: Option<String>,
}

pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<RemindersRequest>,
) -> Result<Json<ReminderReport>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_setup(&state)?;

    let date = match body.date.as_deref() {
        Some(raw) => {
            parse_date(raw).ok_or_else(|| AppError::BadRequest(format!("unparseable date {raw:?}")))?
        }
        None => state.config.business_now().date() + chrono::Duration::days(1),
    };

    Ok(Json(bookings::send_reminders(&state, date).await?))
}

// POST /api/admin/view
#[derive(Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub state: ViewState,
    pub action: ViewAction,
}

pub async fn update_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ViewRequest>,
) -> Result<Json<ViewState>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(reduce(body.state, body.action)))
}
