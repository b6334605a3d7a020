use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_ADULTS: u32 = 1;

/// Upper bound on the party size of a single guest record.
pub const MAX_ADULTS: u32 = 50;

// ===== Lenient field coercion =====

/// Reads a stored numeric field the way the dashboard always has: numbers and
/// numeric strings count, anything else (missing, null, garbage, NaN) is 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Booleans may arrive as `true`, `1` or `"true"`; everything else is false.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true") || s.trim() == "1",
        _ => false,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_number).unwrap_or(0.0))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_flag).unwrap_or(false))
}

// ===== Inventory =====

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ingredient {
    pub id: i64,
    pub hotel_uid: String,
    pub name: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub is_weighed: bool,
    pub stock: f64,
    pub low_stock_threshold: f64,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIngredient {
    pub hotel_uid: String,
    pub name: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub is_weighed: bool,
    #[serde(default)]
    pub stock: f64,
    pub low_stock_threshold: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateIngredient {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub is_weighed: bool,
    pub stock: f64,
    pub low_stock_threshold: f64,
}

// ===== Supplier orders =====

/// A line item of a supplier order, stored inside the order document.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Article {
    #[serde(default, alias = "ingredientId")]
    pub ingredient_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub shortage: f64,
    #[serde(default, alias = "isWeighed", deserialize_with = "lenient_flag")]
    pub is_weighed: bool,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i64,
    pub hotel_uid: String,
    pub supplier: Option<String>,
    pub status: String, // "pending" or "received"
    pub order_date: Option<String>,
    pub delivery_date: Option<String>,
    pub articles: Vec<Article>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrder {
    pub hotel_uid: String,
    pub supplier: Option<String>,
    pub order_date: Option<String>,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReceivedArticle {
    pub index: usize,
    pub shortage: f64,
}

/// One significant shortage on a received order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Manco {
    pub id: String,
    pub order_id: i64,
    pub date: String,
    pub supplier: String,
    pub product: String,
    pub brand: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SupplierStat {
    pub supplier: String,
    pub total_ordered: u32,
    pub total_supplied: u32,
    pub percent_supplied: f64,
}

// ===== Guests and shifts =====

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Guest {
    pub id: i64,
    #[serde(default)]
    pub shift_id: i64,
    pub room: Option<String>,
    pub adults: Option<u32>,
    pub membership: Option<String>,
    pub status: Option<String>, // "included", "excluded" or anything else
    #[serde(default)]
    pub checked: bool,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub stay_duration: Option<u32>,
}

impl Guest {
    /// Adult units this guest counts for; absent or zero means one adult.
    pub fn adult_units(&self) -> u32 {
        match self.adults {
            Some(n) if n > 0 => n,
            _ => DEFAULT_ADULTS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGuest {
    pub shift_id: i64,
    pub room: Option<String>,
    pub adults: Option<u32>,
    pub membership: Option<String>,
    pub status: Option<String>,
    pub stay_duration: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GuestCheckinSnapshot {
    pub room: Option<String>,
    pub status: Option<String>,
    pub membership: Option<String>,
    pub adults: u32,
    pub checked: bool,
    pub checkin_time: Option<DateTime<FixedOffset>>,
    pub stay_duration: Option<u32>,
}

/// Totals are in adult units.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ShiftSummary {
    pub total_count: u64,
    pub checked_in_count: u64,
    pub high_member_count: u64,
    pub included_count: u64,
    pub excluded_count: u64,
    pub non_vip_included_count: u64,
    pub included_checked_in_count: u64,
    pub excluded_checked_in_count: u64,
    pub checkins_per_interval: BTreeMap<String, u64>,
    pub closed: bool,
    pub closed_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShiftData {
    pub date: String,
    pub guest_checkin_snapshots: BTreeMap<i64, GuestCheckinSnapshot>,
    pub summary: ShiftSummary,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shift {
    pub id: i64,
    pub hotel_uid: String,
    pub opened_at: String,
    pub is_open: bool,
    pub date: Option<String>,
    pub closed_at: Option<String>,
    pub summary: Option<ShiftSummary>,
    pub snapshots: Option<BTreeMap<i64, GuestCheckinSnapshot>>,
}
