use crate::db::DatabaseExt;
use crate::error::{AppError, AppResult};
use crate::models::{CreateIngredient, Ingredient, UpdateIngredient};
use rusqlite::{Connection, Row};
use tauri::AppHandle;
use tracing::info;

pub const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 5.0;

const INGREDIENT_COLUMNS: &str = "id, hotel_uid, name, brand, supplier, unit, price, is_weighed, stock, low_stock_threshold, created_at";

fn ingredient_from_row(row: &Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get(0)?,
        hotel_uid: row.get(1)?,
        name: row.get(2)?,
        brand: row.get(3)?,
        supplier: row.get(4)?,
        unit: row.get(5)?,
        price: row.get(6)?,
        is_weighed: row.get(7)?,
        stock: row.get(8)?,
        low_stock_threshold: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub fn list(conn: &Connection, hotel_uid: &str) -> AppResult<Vec<Ingredient>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE hotel_uid = ?1 ORDER BY name"
    ))?;

    let ingredients = stmt
        .query_map([hotel_uid], ingredient_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ingredients)
}

pub fn find(conn: &Connection, id: i64) -> AppResult<Ingredient> {
    conn.query_row(
        &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1"),
        [id],
        ingredient_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Ingredient {id}")),
        other => other.into(),
    })
}

pub fn insert(conn: &Connection, ingredient: CreateIngredient) -> AppResult<Ingredient> {
    if ingredient.name.trim().is_empty() {
        return Err(AppError::Invalid("ingredient name is required".to_string()));
    }

    let threshold = ingredient
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    conn.execute(
        "INSERT INTO ingredients (hotel_uid, name, brand, supplier, unit, price, is_weighed, stock, low_stock_threshold)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            ingredient.hotel_uid,
            ingredient.name.trim(),
            ingredient.brand,
            ingredient.supplier,
            ingredient.unit,
            ingredient.price,
            ingredient.is_weighed,
            ingredient.stock,
            threshold
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(ingredient_id = id, name = %ingredient.name, "ingredient created");

    find(conn, id)
}

pub fn update(conn: &Connection, ingredient: UpdateIngredient) -> AppResult<Ingredient> {
    let changed = conn.execute(
        "UPDATE ingredients
         SET name = ?1, brand = ?2, supplier = ?3, unit = ?4, price = ?5,
             is_weighed = ?6, stock = ?7, low_stock_threshold = ?8
         WHERE id = ?9",
        rusqlite::params![
            ingredient.name,
            ingredient.brand,
            ingredient.supplier,
            ingredient.unit,
            ingredient.price,
            ingredient.is_weighed,
            ingredient.stock,
            ingredient.low_stock_threshold,
            ingredient.id
        ],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("Ingredient {}", ingredient.id)));
    }

    info!(ingredient_id = ingredient.id, stock = ingredient.stock, "ingredient updated");
    find(conn, ingredient.id)
}

pub fn remove(conn: &Connection, id: i64) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Ingredient {id}")));
    }
    Ok(())
}

pub fn low_stock(conn: &Connection, hotel_uid: &str) -> AppResult<Vec<Ingredient>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients
         WHERE hotel_uid = ?1 AND stock <= low_stock_threshold
         ORDER BY stock ASC"
    ))?;

    let ingredients = stmt
        .query_map([hotel_uid], ingredient_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ingredients)
}

#[tauri::command]
pub fn list_ingredients(app: AppHandle, hotel_uid: String) -> Result<Vec<Ingredient>, String> {
    let conn = app.db().lock()?;
    Ok(list(&conn, &hotel_uid)?)
}

#[tauri::command]
pub fn create_ingredient(app: AppHandle, ingredient: CreateIngredient) -> Result<Ingredient, String> {
    let conn = app.db().lock()?;
    Ok(insert(&conn, ingredient)?)
}

#[tauri::command]
pub fn update_ingredient(app: AppHandle, ingredient: UpdateIngredient) -> Result<Ingredient, String> {
    let conn = app.db().lock()?;
    Ok(update(&conn, ingredient)?)
}

#[tauri::command]
pub fn delete_ingredient(app: AppHandle, id: i64) -> Result<(), String> {
    let conn = app.db().lock()?;
    Ok(remove(&conn, id)?)
}

#[tauri::command]
pub fn get_low_stock_ingredients(app: AppHandle, hotel_uid: String) -> Result<Vec<Ingredient>, String> {
    let conn = app.db().lock()?;
    Ok(low_stock(&conn, &hotel_uid)?)
}
