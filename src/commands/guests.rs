use crate::db::DatabaseExt;
use crate::error::{AppError, AppResult};
use crate::models::{CreateGuest, Guest, MAX_ADULTS};
use chrono::{DateTime, FixedOffset, Local};
use rusqlite::{Connection, Row};
use tauri::AppHandle;
use tracing::info;

const GUEST_COLUMNS: &str =
    "id, shift_id, room, adults, membership, status, checked, checkin_time, stay_duration";

fn guest_from_row(row: &Row<'_>) -> rusqlite::Result<Guest> {
    let checkin_time: Option<String> = row.get(7)?;

    Ok(Guest {
        id: row.get(0)?,
        shift_id: row.get(1)?,
        room: row.get(2)?,
        adults: row.get(3)?,
        membership: row.get(4)?,
        status: row.get(5)?,
        checked: row.get(6)?,
        // Unreadable timestamps are treated as missing
        timestamp: checkin_time.and_then(|t| DateTime::parse_from_rfc3339(&t).ok()),
        stay_duration: row.get(8)?,
    })
}

/// Guests of a shift in the order they were added.
pub fn fetch_guests(conn: &Connection, shift_id: i64) -> AppResult<Vec<Guest>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE shift_id = ?1 ORDER BY id"
    ))?;

    let guests = stmt
        .query_map([shift_id], guest_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(guests)
}

pub fn find_guest(conn: &Connection, guest_id: i64) -> AppResult<Guest> {
    conn.query_row(
        &format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = ?1"),
        [guest_id],
        guest_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Guest {guest_id}")),
        other => other.into(),
    })
}

fn ensure_shift_open(conn: &Connection, shift_id: i64) -> AppResult<()> {
    let is_open: bool = conn
        .query_row("SELECT is_open FROM shifts WHERE id = ?1", [shift_id], |row| {
            row.get(0)
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Shift {shift_id}")),
            other => other.into(),
        })?;

    if !is_open {
        return Err(AppError::Conflict(format!("Shift {shift_id} is already closed")));
    }
    Ok(())
}

pub fn insert_guest(conn: &Connection, guest: CreateGuest) -> AppResult<Guest> {
    if let Some(adults) = guest.adults.filter(|&n| n > MAX_ADULTS) {
        return Err(AppError::Invalid(format!(
            "{adults} adults on one guest record (at most {MAX_ADULTS})"
        )));
    }
    ensure_shift_open(conn, guest.shift_id)?;

    conn.execute(
        "INSERT INTO guests (shift_id, room, adults, membership, status, stay_duration)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            guest.shift_id,
            guest.room,
            guest.adults,
            guest.membership,
            guest.status,
            guest.stay_duration
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(guest_id = id, shift_id = guest.shift_id, "guest added");

    find_guest(conn, id)
}

/// Marks a guest as checked in at `at`.
pub fn mark_checked_in(
    conn: &Connection,
    guest_id: i64,
    at: DateTime<FixedOffset>,
) -> AppResult<Guest> {
    let guest = find_guest(conn, guest_id)?;
    ensure_shift_open(conn, guest.shift_id)?;

    if guest.checked {
        return Err(AppError::Conflict(format!("Guest {guest_id} is already checked in")));
    }

    conn.execute(
        "UPDATE guests SET checked = 1, checkin_time = ?1 WHERE id = ?2",
        rusqlite::params![at.to_rfc3339(), guest_id],
    )?;

    info!(guest_id, room = ?guest.room, "guest checked in");
    find_guest(conn, guest_id)
}

pub fn clear_check_in(conn: &Connection, guest_id: i64) -> AppResult<Guest> {
    let guest = find_guest(conn, guest_id)?;
    ensure_shift_open(conn, guest.shift_id)?;

    conn.execute(
        "UPDATE guests SET checked = 0, checkin_time = NULL WHERE id = ?1",
        [guest_id],
    )?;

    info!(guest_id, "check-in undone");
    find_guest(conn, guest_id)
}

#[tauri::command]
pub fn get_shift_guests(app: AppHandle, shift_id: i64) -> Result<Vec<Guest>, String> {
    let conn = app.db().lock()?;
    Ok(fetch_guests(&conn, shift_id)?)
}

#[tauri::command]
pub fn add_guest(app: AppHandle, guest: CreateGuest) -> Result<Guest, String> {
    let conn = app.db().lock()?;
    Ok(insert_guest(&conn, guest)?)
}

#[tauri::command]
pub fn check_in_guest(app: AppHandle, guest_id: i64) -> Result<Guest, String> {
    let conn = app.db().lock()?;
    Ok(mark_checked_in(&conn, guest_id, Local::now().fixed_offset())?)
}

#[tauri::command]
pub fn undo_check_in(app: AppHandle, guest_id: i64) -> Result<Guest, String> {
    let conn = app.db().lock()?;
    Ok(clear_check_in(&conn, guest_id)?)
}
