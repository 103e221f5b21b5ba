//! Database row types — these map directly to SQLite rows.
//! Distinct from bistro-types API models to keep the DB layer independent.
use chrono::{DateTime, NaiveDateTime, Utc};

use bistro_types::models::MenuItem;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

pub struct MenuItemRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
        }
    }
}

pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub created_at: String,
}

pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    pub quantity: i64,
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC; RFC 3339 is accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}
