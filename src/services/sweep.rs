use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::lifecycle::{is_archivable, should_auto_complete};
use crate::state::AppState;

/// The two persistence calls a sweep makes, one record at a time.
pub trait BookingStore {
    fn mark_completed(&self, booking: &Booking) -> anyhow::Result<()>;
    fn archive(&self, booking: &Booking, archived_at: NaiveDateTime) -> anyhow::Result<()>;
}

impl BookingStore for Connection {
    fn mark_completed(&self, booking: &Booking) -> anyhow::Result<()> {
        let updated = queries::update_booking_status(
            self,
            &booking.id,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
        )?;
        anyhow::ensure!(updated, "booking {} is no longer confirmed", booking.id);
        Ok(())
    }

    fn archive(&self, booking: &Booking, archived_at: NaiveDateTime) -> anyhow::Result<()> {
        queries::archive_booking(self, booking, archived_at)
    }
}

#[derive(Debug, Default)]
pub struct SweepPlan {
    pub to_complete: Vec<Booking>,
    pub to_archive: Vec<Booking>,
}

/// Classifies without touching the input. A booking lands in at most one
/// list: auto-completion needs `confirmed`, archival needs `completed`.
pub fn plan_sweep(bookings: &[Booking], now: NaiveDateTime, retention_days: i64) -> SweepPlan {
    let mut plan = SweepPlan::default();
    for booking in bookings {
        if should_auto_complete(now, booking) {
            plan.to_complete.push(booking.clone());
        } else if is_archivable(booking, now, retention_days) {
            plan.to_archive.push(booking.clone());
        }
    }
    plan
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub booking_id: String,
    pub operation: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub completed: usize,
    pub archived: usize,
    pub failed: usize,
    /// Active rows skipped because they could not be decoded.
    pub invalid: usize,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn succeeded(&self) -> usize {
        self.completed + self.archived
    }

    fn record_failure(&mut self, booking_id: &str, operation: &'static str, error: anyhow::Error) {
        let error = format!("{error:#}");
        tracing::warn!(booking_id = %booking_id, operation, error = %error, "sweep step failed");
        self.failed += 1;
        self.failures.push(SweepFailure {
            booking_id: booking_id.to_string(),
            operation,
            error,
        });
    }
}

/// Persists a plan record by record. A failed write is counted and the
/// remaining records still run.
pub fn run_sweep(store: &dyn BookingStore, plan: &SweepPlan, archived_at: NaiveDateTime) -> SweepReport {
    let mut report = SweepReport::default();

    for booking in &plan.to_complete {
        match store.mark_completed(booking) {
            Ok(()) => report.completed += 1,
            Err(e) => report.record_failure(&booking.id, "complete", e),
        }
    }

    for booking in &plan.to_archive {
        match store.archive(booking, archived_at) {
            Ok(()) => report.archived += 1,
            Err(e) => report.record_failure(&booking.id, "archive", e),
        }
    }

    report
}

/// Loads the active set, plans against business-local `now` and persists.
pub fn sweep_store(conn: &Connection, now: NaiveDateTime, retention_days: i64) -> anyhow::Result<SweepReport> {
    let mut bookings = vec![];
    let mut invalid = 0;
    for row in queries::load_active_bookings(conn)? {
        match row {
            Ok(booking) => bookings.push(booking),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed booking during sweep");
                invalid += 1;
            }
        }
    }

    let plan = plan_sweep(&bookings, now, retention_days);
    let mut report = run_sweep(conn, &plan, Utc::now().naive_utc());
    report.invalid = invalid;
    Ok(report)
}

pub fn run_for_state(state: &Arc<AppState>) -> Result<SweepReport, AppError> {
    let now = state.config.business_now();
    let report = {
        let db = state.db();
        sweep_store(&db, now, state.config.retention_days)?
    };

    tracing::info!(
        completed = report.completed,
        archived = report.archived,
        failed = report.failed,
        invalid = report.invalid,
        "booking sweep finished"
    );
    Ok(report)
}
