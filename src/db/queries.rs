use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::models::{Booking, ServiceType};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, name, email, date, time, service_type, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id,
            booking.name,
            booking.email,
            format_ts(&booking.date),
            booking.time,
            booking.service_type.as_str(),
            booking.notes,
            format_ts(&booking.created_at),
            format_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

/// All bookings, earliest date first, then earliest time.
pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, date, time, service_type, notes, created_at, updated_at
         FROM bookings ORDER BY date ASC, time ASC, created_at ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn ping(conn: &Connection) -> anyhow::Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

fn parse_booking_row(row: &Row<'_>) -> anyhow::Result<Booking> {
    let service_type: String = row.get(5)?;
    let date: String = row.get(3)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Booking {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        date: parse_ts(&date)?,
        time: row.get(4)?,
        service_type: ServiceType::parse(&service_type)
            .ok_or_else(|| anyhow::anyhow!("unknown service type in store: {service_type}"))?,
        notes: row.get(6)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}
