use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::models::Booking;

/// Escapes a value for an iCalendar TEXT property (RFC 5545 3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

pub fn generate_ics(booking: &Booking, service_name: &str, duration_minutes: i32, business_name: &str) -> String {
    let start = booking.scheduled_at();
    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = (start + Duration::minutes(duration_minutes as i64))
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = booking.updated_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@salonbook", booking.id);

    let summary = if business_name.is_empty() {
        escape_text(service_name)
    } else {
        escape_text(&format!("{service_name} at {business_name}"))
    };
    let description = escape_text(booking.notes.as_deref().unwrap_or("No additional notes"));
    let status = match booking.status {
        crate::models::BookingStatus::Cancelled => "CANCELLED",
        crate::models::BookingStatus::Pending => "TENTATIVE",
        _ => "CONFIRMED",
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Salonbook//Booking Admin//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

/// Buckets bookings by date for the calendar view, each day in time order.
pub fn group_by_day(bookings: Vec<Booking>) -> BTreeMap<NaiveDate, Vec<Booking>> {
    let mut days: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
    for booking in bookings {
        days.entry(booking.date).or_default().push(booking);
    }
    for day in days.values_mut() {
        day.sort_by_key(|b| b.time);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{parse_date, parse_time};
    use crate::models::BookingStatus;
    use chrono::NaiveDateTime;

    fn booking(id: &str, date: &str, time: &str, notes: Option<&str>) -> Booking {
        let stamp = NaiveDateTime::parse_from_str("2025-03-10 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: id.to_string(),
            date: parse_date(date).unwrap(),
            time: parse_time(time).unwrap(),
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_phone: None,
            service_id: "svc".to_string(),
            staff_id: None,
            status: BookingStatus::Confirmed,
            notes: notes.map(str::to_string),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(
            &booking("test-123", "2025-03-15", "14:00", Some("Sensitive skin")),
            "Facial",
            60,
            "Lotus Spa",
        );
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20250315T140000"));
        assert!(ics.contains("DTEND:20250315T150000"));
        assert!(ics.contains("SUMMARY:Facial at Lotus Spa"));
        assert!(ics.contains("DESCRIPTION:Sensitive skin"));
        assert!(ics.contains("UID:test-123@salonbook"));
        assert!(ics.contains("STATUS:CONFIRMED"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_no_notes() {
        let ics = generate_ics(&booking("test-456", "2025-04-01", "09:30", None), "Pedicure", 30, "");
        assert!(ics.contains("DTEND:20250401T100000"));
        assert!(ics.contains("SUMMARY:Pedicure\r\n"));
        assert!(ics.contains("DESCRIPTION:No additional notes"));
    }

    #[test]
    fn test_generate_ics_escapes_text_values() {
        let ics = generate_ics(
            &booking("test-789", "2025-04-01", "09:30", Some("Oils; no nuts, please\r\nback\\neck")),
            "Wash, Cut; Style",
            45,
            "",
        );
        assert!(ics.contains("SUMMARY:Wash\\, Cut\\; Style\r\n"));
        assert!(ics.contains("DESCRIPTION:Oils\\; no nuts\\, please\\nback\\\\neck\r\n"));
    }

    #[test]
    fn test_group_by_day() {
        let days = group_by_day(vec![
            booking("c", "2025-04-02", "09:00", None),
            booking("b", "2025-04-01", "15:00", None),
            booking("a", "2025-04-01", "09:00", None),
        ]);
        let keys: Vec<String> = days.keys().map(|d| d.to_string()).collect();
        assert_eq!(keys, ["2025-04-01", "2025-04-02"]);
        let first: Vec<&str> = days.values().next().unwrap().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(first, ["a", "b"]);
    }
}
