use crate::commands::orders::fetch_orders;
use crate::db::DatabaseExt;
use crate::error::AppResult;
use crate::manco::{extract_mancos, supplier_stats};
use crate::models::{Manco, SupplierStat};
use rusqlite::Connection;
use tauri::AppHandle;
use tracing::debug;

fn hotel(hotel_uid: Option<&str>) -> Option<&str> {
    hotel_uid.map(str::trim).filter(|uid| !uid.is_empty())
}

/// Significant shortages of a hotel, newest first. Without a hotel the
/// store is not queried at all.
pub fn get_all_mancos(conn: &Connection, hotel_uid: Option<&str>) -> AppResult<Vec<Manco>> {
    let Some(hotel_uid) = hotel(hotel_uid) else {
        return Ok(Vec::new());
    };

    let orders = fetch_orders(conn, hotel_uid)?;
    let mancos = extract_mancos(&orders);
    debug!(hotel = hotel_uid, orders = orders.len(), mancos = mancos.len(), "mancos computed");
    Ok(mancos)
}

pub fn get_supply_stats_per_supplier(
    conn: &Connection,
    hotel_uid: Option<&str>,
) -> AppResult<Vec<SupplierStat>> {
    let Some(hotel_uid) = hotel(hotel_uid) else {
        return Ok(Vec::new());
    };

    let orders = fetch_orders(conn, hotel_uid)?;
    let stats = supplier_stats(&orders);
    debug!(hotel = hotel_uid, suppliers = stats.len(), "supplier stats computed");
    Ok(stats)
}

#[tauri::command]
pub fn get_mancos(app: AppHandle, hotel_uid: Option<String>) -> Result<Vec<Manco>, String> {
    let conn = app.db().lock()?;
    Ok(get_all_mancos(&conn, hotel_uid.as_deref())?)
}

#[tauri::command]
pub fn get_supplier_stats(
    app: AppHandle,
    hotel_uid: Option<String>,
) -> Result<Vec<SupplierStat>, String> {
    let conn = app.db().lock()?;
    Ok(get_supply_stats_per_supplier(&conn, hotel_uid.as_deref())?)
}
