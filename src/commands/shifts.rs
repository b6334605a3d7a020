use crate::commands::guests::fetch_guests;
use crate::db::DatabaseExt;
use crate::error::{AppError, AppResult};
use crate::models::{Shift, ShiftData};
use crate::shift_stats::generate_shift_data;
use chrono::{DateTime, Local, TimeZone};
use rusqlite::{Connection, OptionalExtension, Row};
use std::fmt::Display;
use tauri::AppHandle;
use tracing::info;

const SHIFT_COLUMNS: &str = "id, hotel_uid, opened_at, is_open, date, closed_at, summary, snapshots";

fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<(Shift, Option<String>, Option<String>)> {
    Ok((
        Shift {
            id: row.get(0)?,
            hotel_uid: row.get(1)?,
            opened_at: row.get(2)?,
            is_open: row.get(3)?,
            date: row.get(4)?,
            closed_at: row.get(5)?,
            summary: None,
            snapshots: None,
        },
        row.get(6)?,
        row.get(7)?,
    ))
}

fn with_documents(
    (mut shift, summary, snapshots): (Shift, Option<String>, Option<String>),
) -> AppResult<Shift> {
    shift.summary = summary.map(|s| serde_json::from_str(&s)).transpose()?;
    shift.snapshots = snapshots.map(|s| serde_json::from_str(&s)).transpose()?;
    Ok(shift)
}

pub fn find_open_shift(conn: &Connection, hotel_uid: &str) -> AppResult<Option<Shift>> {
    let row = conn
        .query_row(
            &format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE hotel_uid = ?1 AND is_open = 1"),
            [hotel_uid],
            shift_from_row,
        )
        .optional()?;

    row.map(with_documents).transpose()
}

fn require_open_shift(conn: &Connection, hotel_uid: &str) -> AppResult<Shift> {
    find_open_shift(conn, hotel_uid)?
        .ok_or_else(|| AppError::Conflict("No shift is open. Please open a shift first.".to_string()))
}

pub fn start_shift(conn: &Connection, hotel_uid: &str) -> AppResult<Shift> {
    if hotel_uid.trim().is_empty() {
        return Err(AppError::Invalid("hotel is required".to_string()));
    }
    if let Some(open) = find_open_shift(conn, hotel_uid)? {
        return Err(AppError::Conflict(format!(
            "Shift {} is still open. Close it before opening a new one.",
            open.id
        )));
    }

    conn.execute("INSERT INTO shifts (hotel_uid) VALUES (?1)", [hotel_uid])?;
    let id = conn.last_insert_rowid();
    info!(shift_id = id, hotel = hotel_uid, "shift opened");

    require_open_shift(conn, hotel_uid)
}

/// Aggregates the open shift as if it were closed at `now`, without closing it.
pub fn preview<Tz>(conn: &Connection, hotel_uid: &str, now: &DateTime<Tz>) -> AppResult<ShiftData>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let shift = require_open_shift(conn, hotel_uid)?;
    let guests = fetch_guests(conn, shift.id)?;
    Ok(generate_shift_data(&guests, now))
}

/// Closes the open shift and stores its closure documents.
pub fn finish_shift<Tz>(conn: &Connection, hotel_uid: &str, now: &DateTime<Tz>) -> AppResult<Shift>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let shift = require_open_shift(conn, hotel_uid)?;
    let guests = fetch_guests(conn, shift.id)?;
    let data = generate_shift_data(&guests, now);

    let changed = conn.execute(
        "UPDATE shifts SET is_open = 0, date = ?1, closed_at = ?2, summary = ?3, snapshots = ?4
         WHERE id = ?5 AND is_open = 1",
        rusqlite::params![
            data.date,
            data.summary.closed_at,
            serde_json::to_string(&data.summary)?,
            serde_json::to_string(&data.guest_checkin_snapshots)?,
            shift.id
        ],
    )?;

    if changed == 0 {
        return Err(AppError::Conflict(format!("Shift {} was closed concurrently", shift.id)));
    }

    info!(
        shift_id = shift.id,
        guests = guests.len(),
        checked_in = data.summary.checked_in_count,
        "shift closed"
    );

    find_shift(conn, shift.id)
}

pub fn find_shift(conn: &Connection, shift_id: i64) -> AppResult<Shift> {
    let row = conn
        .query_row(
            &format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"),
            [shift_id],
            shift_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Shift {shift_id}")),
            other => other.into(),
        })?;

    with_documents(row)
}

/// Closed shifts of a hotel, newest first.
pub fn history(conn: &Connection, hotel_uid: &str, limit: Option<u32>) -> AppResult<Vec<Shift>> {
    let limit = limit.unwrap_or(30);

    let mut stmt = conn.prepare(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts
         WHERE hotel_uid = ?1 AND is_open = 0
         ORDER BY id DESC
         LIMIT ?2"
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![hotel_uid, limit], shift_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(with_documents).collect()
}

#[tauri::command]
pub fn open_shift(app: AppHandle, hotel_uid: String) -> Result<Shift, String> {
    let conn = app.db().lock()?;
    Ok(start_shift(&conn, &hotel_uid)?)
}

#[tauri::command]
pub fn get_open_shift(app: AppHandle, hotel_uid: String) -> Result<Option<Shift>, String> {
    let conn = app.db().lock()?;
    Ok(find_open_shift(&conn, &hotel_uid)?)
}

#[tauri::command]
pub fn preview_shift_statistics(app: AppHandle, hotel_uid: String) -> Result<ShiftData, String> {
    let conn = app.db().lock()?;
    Ok(preview(&conn, &hotel_uid, &Local::now())?)
}

#[tauri::command]
pub fn close_shift(app: AppHandle, hotel_uid: String) -> Result<Shift, String> {
    let conn = app.db().lock()?;
    Ok(finish_shift(&conn, &hotel_uid, &Local::now())?)
}

#[tauri::command]
pub fn get_shift_history(
    app: AppHandle,
    hotel_uid: String,
    limit: Option<u32>,
) -> Result<Vec<Shift>, String> {
    let conn = app.db().lock()?;
    Ok(history(&conn, &hotel_uid, limit)?)
}
