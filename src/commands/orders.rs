use crate::db::DatabaseExt;
use crate::error::{AppError, AppResult};
use crate::manco::STATUS_RECEIVED;
use crate::models::{Article, CreateOrder, Order, ReceivedArticle};
use rusqlite::{Connection, Row};
use tauri::AppHandle;
use tracing::{info, warn};

const STATUS_PENDING: &str = "pending";

const ORDER_COLUMNS: &str =
    "id, hotel_uid, supplier, status, order_date, delivery_date, articles, created_at";

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<(Order, String)> {
    Ok((
        Order {
            id: row.get(0)?,
            hotel_uid: row.get(1)?,
            supplier: row.get(2)?,
            status: row.get(3)?,
            order_date: row.get(4)?,
            delivery_date: row.get(5)?,
            articles: Vec::new(),
            created_at: row.get(7)?,
        },
        row.get(6)?,
    ))
}

fn with_articles((mut order, document): (Order, String)) -> AppResult<Order> {
    order.articles = serde_json::from_str::<Option<Vec<Article>>>(&document)?.unwrap_or_default();
    Ok(order)
}

/// All orders of a hotel, articles included, in insertion order.
pub fn fetch_orders(conn: &Connection, hotel_uid: &str) -> AppResult<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE hotel_uid = ?1 ORDER BY id"
    ))?;

    let rows = stmt
        .query_map([hotel_uid], order_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(with_articles).collect()
}

pub fn find_order(conn: &Connection, order_id: i64) -> AppResult<Order> {
    let row = conn
        .query_row(
            &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
            [order_id],
            order_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Order {order_id}")),
            other => other.into(),
        })?;

    with_articles(row)
}

pub fn insert_order(conn: &Connection, order: CreateOrder) -> AppResult<Order> {
    if order.hotel_uid.trim().is_empty() {
        return Err(AppError::Invalid("hotel is required".to_string()));
    }
    if order.articles.is_empty() {
        return Err(AppError::Invalid("an order needs at least one article".to_string()));
    }
    if let Some(bad) = order.articles.iter().find(|a| a.quantity < 0.0) {
        return Err(AppError::Invalid(format!(
            "negative quantity for {}",
            bad.name.as_deref().unwrap_or("article")
        )));
    }

    let order_date = order
        .order_date
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    let document = serde_json::to_string(&order.articles)?;

    conn.execute(
        "INSERT INTO orders (hotel_uid, supplier, status, order_date, articles) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![order.hotel_uid, order.supplier, STATUS_PENDING, order_date, document],
    )?;

    let id = conn.last_insert_rowid();
    info!(order_id = id, hotel = %order.hotel_uid, "order created");

    find_order(conn, id)
}

/// Books a delivery: records shortages, marks the order received and adds
/// what actually arrived to the linked ingredients' stock.
pub fn receive(conn: &Connection, order_id: i64, received: &[ReceivedArticle]) -> AppResult<Order> {
    let mut order = find_order(conn, order_id)?;

    if order.status != STATUS_PENDING {
        return Err(AppError::Conflict(format!(
            "Order {order_id} is already {}",
            order.status
        )));
    }

    for entry in received {
        let article = order.articles.get_mut(entry.index).ok_or_else(|| {
            AppError::Invalid(format!("order {order_id} has no article {}", entry.index))
        })?;
        article.shortage = entry.shortage.max(0.0);
    }

    let delivery_date = order
        .delivery_date
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "UPDATE orders SET status = ?1, delivery_date = ?2, articles = ?3 WHERE id = ?4",
        rusqlite::params![
            STATUS_RECEIVED,
            delivery_date,
            serde_json::to_string(&order.articles)?,
            order_id
        ],
    )?;

    for article in &order.articles {
        let Some(ingredient_id) = article.ingredient_id else {
            continue;
        };
        let arrived = (article.quantity - article.shortage).max(0.0);
        let updated = tx.execute(
            "UPDATE ingredients SET stock = stock + ?1 WHERE id = ?2",
            rusqlite::params![arrived, ingredient_id],
        )?;
        if updated == 0 {
            warn!(order_id, ingredient_id, "received article for unknown ingredient");
        }
    }

    tx.commit()?;

    info!(order_id, articles = order.articles.len(), "order received");

    find_order(conn, order_id)
}

pub fn remove_order(conn: &Connection, order_id: i64) -> AppResult<()> {
    let order = find_order(conn, order_id)?;
    if order.status != STATUS_PENDING {
        return Err(AppError::Conflict(
            "Only pending orders can be deleted".to_string(),
        ));
    }

    conn.execute("DELETE FROM orders WHERE id = ?1", [order_id])?;
    info!(order_id, "order deleted");
    Ok(())
}

#[tauri::command]
pub fn get_orders(app: AppHandle, hotel_uid: String) -> Result<Vec<Order>, String> {
    let conn = app.db().lock()?;
    Ok(fetch_orders(&conn, &hotel_uid)?)
}

#[tauri::command]
pub fn get_order(app: AppHandle, id: i64) -> Result<Order, String> {
    let conn = app.db().lock()?;
    Ok(find_order(&conn, id)?)
}

#[tauri::command]
pub fn create_order(app: AppHandle, order: CreateOrder) -> Result<Order, String> {
    let conn = app.db().lock()?;
    Ok(insert_order(&conn, order)?)
}

#[tauri::command]
#[allow(non_snake_case)]
pub fn receive_order(
    app: AppHandle,
    orderId: i64,
    articles: Vec<ReceivedArticle>,
) -> Result<Order, String> {
    let conn = app.db().lock()?;
    Ok(receive(&conn, orderId, &articles)?)
}

#[tauri::command]
pub fn delete_order(app: AppHandle, id: i64) -> Result<(), String> {
    let conn = app.db().lock()?;
    Ok(remove_order(&conn, id)?)
}
