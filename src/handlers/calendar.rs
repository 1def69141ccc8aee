use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    // Strip .ics suffix if present
    let booking_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let loaded = {
        let db = state.db();
        queries::get_booking_by_id(&db, booking_id).and_then(|booking| {
            let Some(booking) = booking else {
                return Ok(None);
            };
            let service = queries::get_service(&db, &booking.service_id)?;
            let settings = queries::get_settings(&db)?;
            Ok(Some((booking, service, settings.business_name)))
        })
    };

    let (booking, service, business_name) = match loaded {
        Ok(Some(found)) => found,
        Ok(None) => return (StatusCode::NOT_FOUND, "Booking not found").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to load booking for .ics");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    let business_name = if business_name.is_empty() {
        state.config.business_name.clone()
    } else {
        business_name
    };
    let (service_name, duration) = service
        .map(|s| (s.name, s.duration_minutes))
        .unwrap_or_else(|| ("Appointment".to_string(), 60));

    let ics = generate_ics(&booking, &service_name, duration, &business_name);
    let filename = format!("booking-{booking_id}.ics");

    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response()
}
