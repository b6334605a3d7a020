use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tauri::{AppHandle, Manager};
use tracing::info;

use crate::error::{AppError, AppResult};

const DB_FILE_NAME: &str = "hotel_ops.db";

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    /// Opens the store in the platform app-data directory.
    pub fn new(app_handle: &AppHandle) -> AppResult<Self> {
        let app_dir = app_handle
            .path()
            .app_data_dir()
            .map_err(|e| AppError::Invalid(format!("no app data dir: {e}")))?;

        std::fs::create_dir_all(&app_dir)?;

        Self::open(&app_dir.join(DB_FILE_NAME))
    }

    pub fn open(path: &Path) -> AppResult<Self> {
        info!(path = %path.display(), "opening hotel ops database");
        let conn = Connection::open(path)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| AppError::LockPoisoned)
    }

    pub fn initialize(&self) -> AppResult<()> {
        let conn = self.lock()?;
        init_schema(&conn)?;
        info!("database schema ready");
        Ok(())
    }
}

/// Creates all collections and applies column migrations.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Ingredients kept in stock per hotel
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hotel_uid TEXT NOT NULL,
            name TEXT NOT NULL,
            brand TEXT,
            supplier TEXT,
            unit TEXT,
            price REAL,
            is_weighed INTEGER NOT NULL DEFAULT 0,
            stock REAL NOT NULL DEFAULT 0,
            low_stock_threshold REAL NOT NULL DEFAULT 5,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (hotel_uid, name)
        );

        -- Supplier orders; articles is a JSON document
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hotel_uid TEXT NOT NULL,
            supplier TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            order_date TEXT,
            delivery_date TEXT,
            articles TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Guest-service shifts; closed shifts keep their closure documents
        CREATE TABLE IF NOT EXISTS shifts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hotel_uid TEXT NOT NULL,
            opened_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            is_open INTEGER NOT NULL DEFAULT 1,
            date TEXT,
            closed_at TEXT,
            summary TEXT,
            snapshots TEXT
        );

        -- Guests expected during a shift
        CREATE TABLE IF NOT EXISTS guests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            shift_id INTEGER NOT NULL,
            room TEXT,
            adults INTEGER,
            membership TEXT,
            status TEXT,
            checked INTEGER NOT NULL DEFAULT 0,
            checkin_time TEXT,
            stay_duration INTEGER,
            FOREIGN KEY (shift_id) REFERENCES shifts(id)
        );

        CREATE INDEX IF NOT EXISTS idx_orders_hotel ON orders(hotel_uid);
        CREATE INDEX IF NOT EXISTS idx_guests_shift ON guests(shift_id);
        ",
    )?;

    migrate_conn(conn)
}

fn migrate_conn(conn: &Connection) -> Result<()> {
    let columns: Vec<String> = conn
        .prepare("PRAGMA table_info(orders)")?
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|r| r.ok())
        .collect();

    // Early stores tracked only the order date
    if !columns.contains(&"delivery_date".to_string()) {
        info!("migrating orders: adding delivery_date");
        conn.execute("ALTER TABLE orders ADD COLUMN delivery_date TEXT", [])?;
    }

    let columns: Vec<String> = conn
        .prepare("PRAGMA table_info(guests)")?
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|r| r.ok())
        .collect();

    if !columns.contains(&"stay_duration".to_string()) {
        info!("migrating guests: adding stay_duration");
        conn.execute("ALTER TABLE guests ADD COLUMN stay_duration INTEGER", [])?;
    }

    Ok(())
}

pub trait DatabaseExt {
    fn db(&self) -> &Database;
}

impl DatabaseExt for AppHandle {
    fn db(&self) -> &Database {
        self.state::<Database>().inner()
    }
}
