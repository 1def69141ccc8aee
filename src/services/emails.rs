use crate::models::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Confirmed,
    Cancelled,
    Rescheduled,
    Reminder,
}

#[derive(Debug, Clone)]
pub struct Email {
    pub subject: String,
    pub html: String,
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(kind: EmailKind, booking: &Booking, service_name: &str, business_name: &str) -> Email {
    let business = if business_name.is_empty() {
        "our spa"
    } else {
        business_name
    };
    let when = format!(
        "{} at {}",
        booking.date.format("%A, %B %-d, %Y"),
        booking.time.format("%-I:%M %p")
    );

    let (subject, lead) = match kind {
        EmailKind::Confirmed => (
            format!("Your appointment at {business} is confirmed"),
            "Your appointment is confirmed. We look forward to seeing you.",
        ),
        EmailKind::Cancelled => (
            format!("Your appointment at {business} was cancelled"),
            "Your appointment has been cancelled. Contact us any time to book again.",
        ),
        EmailKind::Rescheduled => (
            format!("Your appointment at {business} has a new time"),
            "Your appointment has been moved to a new time.",
        ),
        EmailKind::Reminder => (
            format!("Reminder: your appointment at {business}"),
            "This is a friendly reminder about your upcoming appointment.",
        ),
    };

    let html = format!(
        "<html><body>\
         <p>Hi {name},</p>\
         <p>{lead}</p>\
         <table>\
         <tr><td><strong>Service</strong></td><td>{service}</td></tr>\
         <tr><td><strong>When</strong></td><td>{when}</td></tr>\
         </table>\
         <p>{business}</p>\
         </body></html>",
        name = escape_html(&booking.customer_name),
        service = escape_html(service_name),
        business = escape_html(business),
    );

    Email { subject, html }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{parse_date, parse_time};
    use crate::models::BookingStatus;
    use chrono::NaiveDateTime;

    fn booking(name: &str) -> Booking {
        let now = NaiveDateTime::parse_from_str("2025-03-10 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: "b1".to_string(),
            date: parse_date("2025-03-15").unwrap(),
            time: parse_time("14:00").unwrap(),
            customer_name: name.to_string(),
            customer_email: "c@example.com".to_string(),
            customer_phone: None,
            service_id: "svc".to_string(),
            staff_id: None,
            status: BookingStatus::Confirmed,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_confirmation_email() {
        let email = render(EmailKind::Confirmed, &booking("Alice"), "Hot Stone Massage", "Lotus Spa");
        assert_eq!(email.subject, "Your appointment at Lotus Spa is confirmed");
        assert!(email.html.contains("Hi Alice,"));
        assert!(email.html.contains("Hot Stone Massage"));
        assert!(email.html.contains("Saturday, March 15, 2025 at 2:00 PM"));
    }

    #[test]
    fn test_customer_name_is_escaped() {
        let email = render(EmailKind::Reminder, &booking("<b>Eve</b>"), "Facial", "");
        assert!(email.html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(email.subject.contains("our spa"));
    }

    #[test]
    fn test_each_kind_has_distinct_subject() {
        let b = booking("Alice");
        let subjects: Vec<String> = [
            EmailKind::Confirmed,
            EmailKind::Cancelled,
            EmailKind::Rescheduled,
            EmailKind::Reminder,
        ]
        .into_iter()
        .map(|k| render(k, &b, "Facial", "Lotus").subject)
        .collect();
        for (i, a) in subjects.iter().enumerate() {
            for b in &subjects[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
