use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::errors::AppError;
use crate::models::{Booking, BookingAction, BookingStatus};

/// How long after its start time a confirmed appointment is assumed finished.
pub const GRACE_PERIOD_HOURS: i64 = 2;
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

pub fn grace_period() -> Duration {
    Duration::hours(GRACE_PERIOD_HOURS)
}

pub fn should_auto_complete(now: NaiveDateTime, booking: &Booking) -> bool {
    booking.status == BookingStatus::Confirmed && now - booking.scheduled_at() > grace_period()
}

/// Completed bookings whose date (taken at midnight) falls strictly before
/// `now - retention_days`.
pub fn is_archivable(booking: &Booking, now: NaiveDateTime, retention_days: i64) -> bool {
    let cutoff = now - Duration::days(retention_days);
    booking.status == BookingStatus::Completed && booking.date.and_time(NaiveTime::MIN) < cutoff
}

pub fn next_status(current: BookingStatus, action: BookingAction) -> Result<BookingStatus, AppError> {
    use BookingAction::*;
    use BookingStatus::*;

    match (current, action) {
        (Pending, Confirm) => Ok(Confirmed),
        (Pending, Cancel) => Ok(Cancelled),
        (Confirmed, Complete) => Ok(Completed),
        (Confirmed, Cancel) => Ok(Cancelled),
        (Confirmed, Reschedule) => Ok(Confirmed),
        (Cancelled, Confirm) => Ok(Confirmed),
        (from, action) => Err(AppError::InvalidTransition { from, action }),
    }
}
