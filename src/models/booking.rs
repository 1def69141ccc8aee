use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// The single ordered point used for every lifecycle comparison.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A booking moved out of the active set. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchivedBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub archived_at: NaiveDateTime,
}

impl ArchivedBooking {
    pub fn new(booking: Booking, archived_at: NaiveDateTime) -> Self {
        Self {
            booking,
            archived_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Strict parse. Unknown values are rejected rather than defaulted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin or sweep commands that move a booking between statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    /// pending -> confirmed, or cancelled -> confirmed (reconfirm)
    Confirm,
    Cancel,
    Complete,
    /// Keeps a confirmed booking confirmed; the caller changes date/time.
    Reschedule,
}

impl BookingAction {
    pub const ALL: [BookingAction; 4] = [
        BookingAction::Confirm,
        BookingAction::Cancel,
        BookingAction::Complete,
        BookingAction::Reschedule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Cancel => "cancel",
            BookingAction::Complete => "complete",
            BookingAction::Reschedule => "reschedule",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(BookingAction::Confirm),
            "cancel" => Some(BookingAction::Cancel),
            "complete" => Some(BookingAction::Complete),
            "reschedule" => Some(BookingAction::Reschedule),
            _ => None,
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw booking fields as they arrive from a request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBooking {
    pub date: Option<String>,
    pub time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_id: Option<String>,
    pub staff_id: Option<String>,
    pub notes: Option<String>,
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_strict() {
        for status in BookingStatus::ALL {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("archived"), None);
        assert_eq!(BookingStatus::parse("Confirmed"), None);
    }

    #[test]
    fn test_scheduled_at_combines_date_and_time() {
        let now = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", TIMESTAMP_FORMAT).unwrap();
        let booking = Booking {
            id: "b1".to_string(),
            date: parse_date("2024-03-05").unwrap(),
            time: parse_time("14:30").unwrap(),
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_phone: None,
            service_id: "svc".to_string(),
            staff_id: None,
            status: BookingStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            booking.scheduled_at().format(TIMESTAMP_FORMAT).to_string(),
            "2024-03-05 14:30:00"
        );
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:15:00"), parse_time("09:15"));
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("").is_none());
    }

    #[test]
    fn test_archived_booking_serializes_flat() {
        let now = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", TIMESTAMP_FORMAT).unwrap();
        let booking = Booking {
            id: "b2".to_string(),
            date: parse_date("2024-01-01").unwrap(),
            time: parse_time("10:00").unwrap(),
            customer_name: "Bo".to_string(),
            customer_email: "bo@example.com".to_string(),
            customer_phone: Some("+15550001111".to_string()),
            service_id: "svc".to_string(),
            staff_id: None,
            status: BookingStatus::Completed,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(ArchivedBooking::new(booking, now)).unwrap();
        assert_eq!(json["id"], "b2");
        assert_eq!(json["status"], "completed");
        assert!(json.get("archived_at").is_some());
    }
}
