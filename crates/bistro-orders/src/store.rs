use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

use bistro_db::Database;
use bistro_db::models::{OrderItemRow, OrderRow, parse_timestamp};
use bistro_types::models::{Order, OrderItem, OrderStatus};

/// Persistence contract the lifecycle depends on.
pub trait OrderStore: Send + Sync {
    /// Atomically create a pending order with its lines; returns the order id.
    fn insert(&self, owner_id: i64, lines: &[(i64, i64)]) -> Result<i64>;
    fn find(&self, order_id: i64) -> Result<Option<Order>>;
    fn list(&self, owner_id: Option<i64>) -> Result<Vec<Order>>;
    /// Compare-and-swap; false if the status moved on (or the order vanished).
    fn swap_status(&self, order_id: i64, expected: &OrderStatus, next: &OrderStatus) -> Result<bool>;
    /// Unconditional overwrite; false if the order does not exist.
    fn overwrite_status(&self, order_id: i64, next: &OrderStatus) -> Result<bool>;
}

impl OrderStore for Database {
    fn insert(&self, owner_id: i64, lines: &[(i64, i64)]) -> Result<i64> {
        self.insert_order(owner_id, OrderStatus::Pending.as_str(), lines)
    }

    fn find(&self, order_id: i64) -> Result<Option<Order>> {
        let Some(row) = self.get_order(order_id)? else {
            return Ok(None);
        };
        let items = self.get_items_for_orders(&[row.id])?;
        Ok(assemble(vec![row], items).pop())
    }

    fn list(&self, owner_id: Option<i64>) -> Result<Vec<Order>> {
        let rows = self.list_orders(owner_id)?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let items = self.get_items_for_orders(&ids)?;
        Ok(assemble(rows, items))
    }

    fn swap_status(&self, order_id: i64, expected: &OrderStatus, next: &OrderStatus) -> Result<bool> {
        self.swap_order_status(order_id, expected.as_str(), next.as_str())
    }

    fn overwrite_status(&self, order_id: i64, next: &OrderStatus) -> Result<bool> {
        self.set_order_status(order_id, next.as_str())
    }
}

/// Attach item rows to their orders, preserving the order of `rows`.
fn assemble(rows: Vec<OrderRow>, items: Vec<OrderItemRow>) -> Vec<Order> {
    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(OrderItem {
            id: item.id,
            order_id: item.order_id,
            menu_id: item.menu_id,
            quantity: item.quantity,
        });
    }

    rows.into_iter()
        .map(|row| Order {
            id: row.id,
            user_id: row.user_id,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(|| {
                warn!("Corrupt created_at '{}' on order {}", row.created_at, row.id);
                chrono::DateTime::default()
            }),
            status: OrderStatus::from(row.status),
            items: by_order.remove(&row.id).unwrap_or_default(),
        })
        .collect()
}
