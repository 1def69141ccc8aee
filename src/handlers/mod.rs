pub mod admin;
pub mod bookings;
pub mod calendar;
pub mod catalog;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/admin", get(admin::admin_page))
        .route(
            "/api/admin/setup",
            get(admin::get_setup).post(admin::complete_setup),
        )
        .route("/api/admin/status", get(admin::get_status))
        .route("/api/admin/sweep", post(admin::run_sweep))
        .route("/api/admin/reminders", post(admin::send_reminders))
        .route("/api/admin/view", post(admin::update_view))
        .route(
            "/api/admin/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/admin/bookings/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .route(
            "/api/admin/bookings/:id/confirm",
            post(bookings::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id/cancel",
            post(bookings::cancel_booking),
        )
        .route(
            "/api/admin/bookings/:id/complete",
            post(bookings::complete_booking),
        )
        .route(
            "/api/admin/bookings/:id/reschedule",
            post(bookings::reschedule_booking),
        )
        .route("/api/admin/calendar", get(bookings::calendar_view))
        .route("/api/admin/archive", get(bookings::list_archive))
        .route(
            "/api/admin/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/admin/services",
            get(catalog::list_services).post(catalog::create_service),
        )
        .route("/api/admin/services/:id", put(catalog::update_service))
        .route(
            "/api/admin/staff",
            get(catalog::list_staff).post(catalog::create_staff),
        )
        .route("/api/admin/staff/:id/active", post(catalog::set_staff_active))
        .route("/calendar/:booking_id", get(calendar::download_ics))
        .with_state(state)
}
