use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::AppError;
use crate::models::booking::{parse_date, parse_time, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use crate::models::{
    ArchivedBooking, Booking, BookingStatus, Service, ServiceCategory, Settings, Staff,
};

const BOOKING_COLUMNS: &str = "id, date, time, customer_name, customer_email, customer_phone, \
     service_id, staff_id, status, notes, created_at, updated_at";

fn now_stamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, date, time, customer_name, customer_email, customer_phone,
                               service_id, staff_id, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            booking.id,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time.format(TIME_FORMAT).to_string(),
            booking.customer_name,
            booking.customer_email,
            booking.customer_phone,
            booking.service_id,
            booking.staff_id,
            booking.status.as_str(),
            booking.notes,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .context("failed to insert booking")?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?;

    match result {
        Some(booking) => Ok(Some(booking?)),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<&str> = vec![];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = filter.status {
        values.push(Box::new(status.as_str()));
        clauses.push("status = ?");
    }
    if let Some(from) = filter.from {
        values.push(Box::new(from.format(DATE_FORMAT).to_string()));
        clauses.push("date >= ?");
    }
    if let Some(to) = filter.to {
        values.push(Box::new(to.format(DATE_FORMAT).to_string()));
        clauses.push("date <= ?");
    }
    // SQLite treats a negative LIMIT as unbounded
    values.push(Box::new(filter.limit.map_or(-1, |l| l.max(0))));

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings {where_sql} ORDER BY date ASC, time ASC LIMIT ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Every active booking, decoded one by one. Rows that fail validation come
/// back as `Err` so a batch caller can skip them without losing the rest.
pub fn load_active_bookings(conn: &Connection) -> anyhow::Result<Vec<anyhow::Result<Booking>>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY date ASC, time ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Moves a booking from `expected` to `status`. Returns false when the row is
/// gone or no longer in `expected`, so a stale read never overwrites a
/// concurrent transition.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    expected: BookingStatus,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![status.as_str(), now_stamp(), id, expected.as_str()],
    )?;
    Ok(count > 0)
}

/// Same guard as [`update_booking_status`], also moving the date and time.
pub fn reschedule_booking(
    conn: &Connection,
    id: &str,
    expected: BookingStatus,
    date: NaiveDate,
    time: NaiveTime,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET date = ?1, time = ?2, status = ?3, updated_at = ?4
         WHERE id = ?5 AND status = ?6",
        params![
            date.format(DATE_FORMAT).to_string(),
            time.format(TIME_FORMAT).to_string(),
            status.as_str(),
            now_stamp(),
            id,
            expected.as_str(),
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// Copies the booking into the archive and removes the active row in one
/// transaction. Fails if the active row is already gone.
pub fn archive_booking(
    conn: &Connection,
    booking: &Booking,
    archived_at: NaiveDateTime,
) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO archived_bookings (id, date, time, customer_name, customer_email, customer_phone,
                                        service_id, staff_id, status, notes, created_at, updated_at, archived_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            booking.id,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time.format(TIME_FORMAT).to_string(),
            booking.customer_name,
            booking.customer_email,
            booking.customer_phone,
            booking.service_id,
            booking.staff_id,
            booking.status.as_str(),
            booking.notes,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            archived_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )
    .with_context(|| format!("failed to insert archive copy of booking {}", booking.id))?;

    let removed = tx.execute("DELETE FROM bookings WHERE id = ?1", params![booking.id])?;
    anyhow::ensure!(removed == 1, "booking {} is no longer active", booking.id);

    tx.commit()?;
    Ok(())
}

pub fn list_archived(conn: &Connection, limit: i64) -> anyhow::Result<Vec<ArchivedBooking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS}, archived_at FROM archived_bookings \
         ORDER BY archived_at DESC, date DESC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit.max(0)], |row| Ok(parse_archived_row(row)))?;

    let mut archived = vec![];
    for row in rows {
        archived.push(row??);
    }
    Ok(archived)
}

pub fn get_archived_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<ArchivedBooking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS}, archived_at FROM archived_bookings WHERE id = ?1");
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_archived_row(row)))
        .optional()?;

    match result {
        Some(archived) => Ok(Some(archived?)),
        None => Ok(None),
    }
}

pub struct DashboardStats {
    pub pending_total: i64,
    pub pending_today: i64,
    pub upcoming_confirmed: i64,
    pub completed_total: i64,
    pub archived_total: i64,
}

/// `now` is business-local wall-clock time; "today" is its date.
pub fn get_dashboard_stats(conn: &Connection, now: NaiveDateTime) -> anyhow::Result<DashboardStats> {
    let today = now.date().format(DATE_FORMAT).to_string();
    let now_str = now.format("%Y-%m-%d %H:%M").to_string();

    let count = |sql: &str, p: &[&dyn rusqlite::types::ToSql]| -> anyhow::Result<i64> {
        Ok(conn.query_row(sql, p, |row| row.get(0))?)
    };

    Ok(DashboardStats {
        pending_total: count("SELECT COUNT(*) FROM bookings WHERE status = 'pending'", params![])?,
        pending_today: count(
            "SELECT COUNT(*) FROM bookings WHERE status = 'pending' AND date = ?1",
            params![today],
        )?,
        upcoming_confirmed: count(
            "SELECT COUNT(*) FROM bookings WHERE status = 'confirmed' AND date || ' ' || time > ?1",
            params![now_str],
        )?,
        completed_total: count("SELECT COUNT(*) FROM bookings WHERE status = 'completed'", params![])?,
        archived_total: count("SELECT COUNT(*) FROM archived_bookings", params![])?,
    })
}

fn invalid(id: &str, what: &str, value: &str) -> anyhow::Error {
    AppError::InvalidBooking(format!("booking {id} has malformed {what} {value:?}")).into()
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let date_str: String = row.get(1)?;
    let time_str: String = row.get(2)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    let date = parse_date(&date_str).ok_or_else(|| invalid(&id, "date", &date_str))?;
    let time = parse_time(&time_str).ok_or_else(|| invalid(&id, "time", &time_str))?;
    let status =
        BookingStatus::parse(&status_str).ok_or_else(|| invalid(&id, "status", &status_str))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .map_err(|_| invalid(&id, "created_at", &created_at_str))?;
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FORMAT)
        .map_err(|_| invalid(&id, "updated_at", &updated_at_str))?;

    Ok(Booking {
        id,
        date,
        time,
        customer_name: row.get(3)?,
        customer_email: row.get(4)?,
        customer_phone: row.get(5)?,
        service_id: row.get(6)?,
        staff_id: row.get(7)?,
        status,
        notes: row.get(9)?,
        created_at,
        updated_at,
    })
}

fn parse_archived_row(row: &rusqlite::Row) -> anyhow::Result<ArchivedBooking> {
    let booking = parse_booking_row(row)?;
    let archived_at_str: String = row.get(12)?;
    let archived_at = NaiveDateTime::parse_from_str(&archived_at_str, TIMESTAMP_FORMAT)
        .map_err(|_| invalid(&booking.id, "archived_at", &archived_at_str))?;
    Ok(ArchivedBooking::new(booking, archived_at))
}

// ── Service Categories ──

pub fn insert_category(conn: &Connection, category: &ServiceCategory) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO service_categories (id, name, sort_order) VALUES (?1, ?2, ?3)",
        params![category.id, category.name, category.sort_order],
    )
    .context("failed to insert service category")?;
    Ok(())
}

pub fn list_categories(conn: &Connection) -> anyhow::Result<Vec<ServiceCategory>> {
    let mut stmt =
        conn.prepare("SELECT id, name, sort_order FROM service_categories ORDER BY sort_order, name")?;
    let rows = stmt.query_map([], |row| {
        Ok(ServiceCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            sort_order: row.get(2)?,
        })
    })?;

    let mut categories = vec![];
    for row in rows {
        categories.push(row?);
    }
    Ok(categories)
}

// ── Services ──

pub fn save_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, category_id, duration_minutes, price_cents, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           category_id = excluded.category_id,
           duration_minutes = excluded.duration_minutes,
           price_cents = excluded.price_cents,
           active = excluded.active",
        params![
            service.id,
            service.name,
            service.category_id,
            service.duration_minutes,
            service.price_cents,
            service.active as i32,
        ],
    )
    .context("failed to save service")?;
    Ok(())
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        duration_minutes: row.get(3)?,
        price_cents: row.get(4)?,
        active: row.get::<_, i32>(5)? != 0,
    })
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    Ok(conn
        .query_row(
            "SELECT id, name, category_id, duration_minutes, price_cents, active FROM services WHERE id = ?1",
            params![id],
            parse_service_row,
        )
        .optional()?)
}

pub fn list_services(conn: &Connection, category_id: Option<&str>) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category_id, duration_minutes, price_cents, active FROM services
         WHERE (?1 IS NULL OR category_id = ?1) ORDER BY name",
    )?;
    let rows = stmt.query_map(params![category_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

// ── Staff ──

pub fn insert_staff(conn: &Connection, staff: &Staff) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO staff (id, name, email, phone, active) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![staff.id, staff.name, staff.email, staff.phone, staff.active as i32],
    )
    .context("failed to insert staff member")?;
    Ok(())
}

fn parse_staff_row(row: &rusqlite::Row) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        active: row.get::<_, i32>(4)? != 0,
    })
}

pub fn get_staff(conn: &Connection, id: &str) -> anyhow::Result<Option<Staff>> {
    Ok(conn
        .query_row(
            "SELECT id, name, email, phone, active FROM staff WHERE id = ?1",
            params![id],
            parse_staff_row,
        )
        .optional()?)
}

pub fn list_staff(conn: &Connection, active_only: bool) -> anyhow::Result<Vec<Staff>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, active FROM staff
         WHERE (?1 = 0 OR active = 1) ORDER BY name",
    )?;
    let rows = stmt.query_map(params![active_only as i32], parse_staff_row)?;

    let mut staff = vec![];
    for row in rows {
        staff.push(row?);
    }
    Ok(staff)
}

pub fn set_staff_active(conn: &Connection, id: &str, active: bool) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE staff SET active = ?1 WHERE id = ?2",
        params![active as i32, id],
    )?;
    Ok(count > 0)
}

// ── Settings ──

pub fn get_settings(conn: &Connection) -> anyhow::Result<Settings> {
    let (business_name, setup_complete, completed_at): (String, i32, Option<String>) = conn
        .query_row(
            "SELECT business_name, setup_complete, setup_completed_at FROM settings WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .context("settings row missing")?;

    Ok(Settings {
        business_name,
        setup_complete: setup_complete != 0,
        setup_completed_at: completed_at
            .and_then(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).ok()),
    })
}

/// Records the business name and flips the setup flag. Re-running setup
/// updates the name but keeps the original completion timestamp.
pub fn complete_setup(conn: &Connection, business_name: &str) -> anyhow::Result<Settings> {
    conn.execute(
        "UPDATE settings SET
           business_name = ?1,
           setup_complete = 1,
           setup_completed_at = COALESCE(setup_completed_at, ?2)
         WHERE id = 1",
        params![business_name, now_stamp()],
    )?;
    get_settings(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        save_service(
            &conn,
            &Service {
                id: "svc-1".to_string(),
                name: "Swedish Massage".to_string(),
                category_id: None,
                duration_minutes: 60,
                price_cents: 9000,
                active: true,
            },
        )
        .unwrap();
        conn
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn booking(id: &str, date: &str, time: &str, status: BookingStatus) -> Booking {
        let created = ts("2024-01-01 09:00:00");
        Booking {
            id: id.to_string(),
            date: parse_date(date).unwrap(),
            time: parse_time(time).unwrap(),
            customer_name: "Alice".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_phone: Some("+15551110000".to_string()),
            service_id: "svc-1".to_string(),
            staff_id: None,
            status,
            notes: Some("first visit".to_string()),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_insert_and_get_booking() {
        let conn = setup_db();
        let b = booking("b1", "2024-03-01", "10:00", BookingStatus::Pending);
        insert_booking(&conn, &b).unwrap();

        let loaded = get_booking_by_id(&conn, "b1").unwrap().unwrap();
        assert_eq!(loaded, b);
        assert!(get_booking_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_unknown_service() {
        let conn = setup_db();
        let mut b = booking("b1", "2024-03-01", "10:00", BookingStatus::Pending);
        b.service_id = "nope".to_string();
        assert!(insert_booking(&conn, &b).is_err());
    }

    #[test]
    fn test_list_bookings_filters() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b1", "2024-03-01", "10:00", BookingStatus::Pending)).unwrap();
        insert_booking(&conn, &booking("b2", "2024-03-02", "09:00", BookingStatus::Confirmed)).unwrap();
        insert_booking(&conn, &booking("b3", "2024-03-05", "11:00", BookingStatus::Confirmed)).unwrap();

        let all = list_bookings(&conn, &BookingFilter::default()).unwrap();
        assert_eq!(all.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(), ["b1", "b2", "b3"]);

        let confirmed = list_bookings(
            &conn,
            &BookingFilter {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(confirmed.len(), 2);

        let ranged = list_bookings(
            &conn,
            &BookingFilter {
                from: parse_date("2024-03-02"),
                to: parse_date("2024-03-04"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].id, "b2");

        let limited = list_bookings(
            &conn,
            &BookingFilter {
                limit: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_malformed_row_is_invalid_booking() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b1", "2024-03-01", "10:00", BookingStatus::Pending)).unwrap();
        conn.execute("UPDATE bookings SET time = 'soon' WHERE id = 'b1'", [])
            .unwrap();

        let err = get_booking_by_id(&conn, "b1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidBooking(_))
        ));

        let loaded = load_active_bookings(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_err());
    }

    #[test]
    fn test_update_status_and_reschedule() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b1", "2024-03-01", "10:00", BookingStatus::Pending)).unwrap();

        assert!(update_booking_status(&conn, "b1", BookingStatus::Pending, BookingStatus::Confirmed).unwrap());
        assert!(!update_booking_status(&conn, "missing", BookingStatus::Pending, BookingStatus::Confirmed).unwrap());

        let date = parse_date("2024-03-09").unwrap();
        let time = parse_time("15:30").unwrap();
        assert!(reschedule_booking(
            &conn,
            "b1",
            BookingStatus::Confirmed,
            date,
            time,
            BookingStatus::Confirmed
        )
        .unwrap());

        let loaded = get_booking_by_id(&conn, "b1").unwrap().unwrap();
        assert_eq!(loaded.status, BookingStatus::Confirmed);
        assert_eq!(loaded.date, date);
        assert_eq!(loaded.time, time);
        assert!(loaded.updated_at > loaded.created_at);
    }

    #[test]
    fn test_stale_status_write_is_refused() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b1", "2024-03-01", "10:00", BookingStatus::Confirmed)).unwrap();

        // Admin read the booking as confirmed, then the sweep completed it
        let seen = get_booking_by_id(&conn, "b1").unwrap().unwrap().status;
        assert!(update_booking_status(&conn, "b1", BookingStatus::Confirmed, BookingStatus::Completed).unwrap());

        assert!(!update_booking_status(&conn, "b1", seen, BookingStatus::Cancelled).unwrap());
        let date = parse_date("2024-03-09").unwrap();
        let time = parse_time("15:30").unwrap();
        assert!(!reschedule_booking(&conn, "b1", seen, date, time, BookingStatus::Confirmed).unwrap());

        let loaded = get_booking_by_id(&conn, "b1").unwrap().unwrap();
        assert_eq!(loaded.status, BookingStatus::Completed);
        assert_eq!(loaded.date, parse_date("2024-03-01").unwrap());
    }

    #[test]
    fn test_archive_preserves_fields_and_removes_active() {
        let conn = setup_db();
        let b = booking("b1", "2024-01-01", "08:00", BookingStatus::Completed);
        insert_booking(&conn, &b).unwrap();

        let archived_at = ts("2024-03-01 00:00:00");
        archive_booking(&conn, &b, archived_at).unwrap();

        assert!(get_booking_by_id(&conn, "b1").unwrap().is_none());
        let archived = get_archived_by_id(&conn, "b1").unwrap().unwrap();
        assert_eq!(archived.booking, b);
        assert_eq!(archived.archived_at, archived_at);
        assert_eq!(list_archived(&conn, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_archive_twice_fails_without_side_effects() {
        let conn = setup_db();
        let b = booking("b1", "2024-01-01", "08:00", BookingStatus::Completed);
        insert_booking(&conn, &b).unwrap();
        archive_booking(&conn, &b, ts("2024-03-01 00:00:00")).unwrap();

        assert!(archive_booking(&conn, &b, ts("2024-03-02 00:00:00")).is_err());
        let archived = get_archived_by_id(&conn, "b1").unwrap().unwrap();
        assert_eq!(archived.archived_at, ts("2024-03-01 00:00:00"));
    }

    #[test]
    fn test_archived_rows_are_append_only() {
        let conn = setup_db();
        let b = booking("b1", "2024-01-01", "08:00", BookingStatus::Completed);
        insert_booking(&conn, &b).unwrap();
        archive_booking(&conn, &b, ts("2024-03-01 00:00:00")).unwrap();

        let result = conn.execute(
            "UPDATE archived_bookings SET customer_name = 'Mallory' WHERE id = 'b1'",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute("DELETE FROM archived_bookings WHERE id = 'b1'", []);
        assert!(result.is_err());
        assert!(get_archived_by_id(&conn, "b1").unwrap().is_some());
    }

    #[test]
    fn test_dashboard_stats() {
        let conn = setup_db();
        insert_booking(&conn, &booking("b1", "2024-03-01", "10:00", BookingStatus::Pending)).unwrap();
        insert_booking(&conn, &booking("b2", "2024-03-02", "10:00", BookingStatus::Pending)).unwrap();
        insert_booking(&conn, &booking("b3", "2024-03-01", "16:00", BookingStatus::Confirmed)).unwrap();
        insert_booking(&conn, &booking("b4", "2024-03-01", "08:00", BookingStatus::Confirmed)).unwrap();
        insert_booking(&conn, &booking("b5", "2024-02-01", "08:00", BookingStatus::Completed)).unwrap();

        let stats = get_dashboard_stats(&conn, ts("2024-03-01 12:00:00")).unwrap();
        assert_eq!(stats.pending_total, 2);
        assert_eq!(stats.pending_today, 1);
        assert_eq!(stats.upcoming_confirmed, 1);
        assert_eq!(stats.completed_total, 1);
        assert_eq!(stats.archived_total, 0);
    }

    #[test]
    fn test_services_and_categories() {
        let conn = setup_db();
        insert_category(
            &conn,
            &ServiceCategory {
                id: "cat-1".to_string(),
                name: "Nails".to_string(),
                sort_order: 1,
            },
        )
        .unwrap();
        save_service(
            &conn,
            &Service {
                id: "svc-2".to_string(),
                name: "Manicure".to_string(),
                category_id: Some("cat-1".to_string()),
                duration_minutes: 45,
                price_cents: 3500,
                active: true,
            },
        )
        .unwrap();

        assert_eq!(list_services(&conn, None).unwrap().len(), 2);
        let nails = list_services(&conn, Some("cat-1")).unwrap();
        assert_eq!(nails.len(), 1);
        assert_eq!(nails[0].name, "Manicure");
        assert_eq!(list_categories(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_staff_active_toggle() {
        let conn = setup_db();
        insert_staff(
            &conn,
            &Staff {
                id: "st-1".to_string(),
                name: "Mia".to_string(),
                email: "mia@example.com".to_string(),
                phone: None,
                active: true,
            },
        )
        .unwrap();

        assert!(set_staff_active(&conn, "st-1", false).unwrap());
        assert!(list_staff(&conn, true).unwrap().is_empty());
        assert_eq!(list_staff(&conn, false).unwrap().len(), 1);
        assert!(!get_staff(&conn, "st-1").unwrap().unwrap().active);
    }

    #[test]
    fn test_setup_flag() {
        let conn = setup_db();
        assert!(!get_settings(&conn).unwrap().setup_complete);

        let settings = complete_setup(&conn, "Lotus Spa").unwrap();
        assert!(settings.setup_complete);
        assert_eq!(settings.business_name, "Lotus Spa");
        let first = settings.setup_completed_at;
        assert!(first.is_some());

        let again = complete_setup(&conn, "Lotus Day Spa").unwrap();
        assert_eq!(again.business_name, "Lotus Day Spa");
        assert_eq!(again.setup_completed_at, first);
    }
}
