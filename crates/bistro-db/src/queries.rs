use crate::Database;
use crate::models::{MenuItemRow, OrderItemRow, OrderRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Order ids bound per `IN (...)` query when fetching order lines.
pub const ITEM_BATCH: usize = 500;

impl Database {
    // -- Users --

    /// Insert a user and return its id. A duplicate username surfaces as a
    /// constraint violation (see [`crate::is_constraint_violation`]).
    pub fn create_user(&self, username: &str, password_hash: &str, role: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        role: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    // -- Menu items --

    pub fn list_menu_items(&self) -> Result<Vec<MenuItemRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, description, price FROM menu_items ORDER BY id")?;
            let rows = stmt
                .query_map([], map_menu_item)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_menu_item(&self, id: i64) -> Result<Option<MenuItemRow>> {
        self.with_conn(|conn| query_menu_item(conn, id))
    }

    pub fn insert_menu_item(&self, name: &str, description: &str, price: f64) -> Result<MenuItemRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO menu_items (name, description, price) VALUES (?1, ?2, ?3)",
                params![name, description, price],
            )?;
            Ok(MenuItemRow {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                description: description.to_string(),
                price,
            })
        })
    }

    /// Overwrite a menu item. Returns `None` when no such item exists.
    pub fn update_menu_item(
        &self,
        id: i64,
        name: &str,
        description: &str,
        price: f64,
    ) -> Result<Option<MenuItemRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE menu_items SET name = ?2, description = ?3, price = ?4 WHERE id = ?1",
                params![id, name, description, price],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_menu_item(conn, id)
        })
    }

    pub fn delete_menu_item(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM menu_items WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Orders --

    /// Insert an order and all of its lines in one transaction.
    /// Returns the new order id.
    pub fn insert_order(&self, user_id: i64, status: &str, lines: &[(i64, i64)]) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO orders (user_id, status) VALUES (?1, ?2)",
                params![user_id, status],
            )?;
            let order_id = tx.last_insert_rowid();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO order_items (order_id, menu_id, quantity) VALUES (?1, ?2, ?3)",
                )?;
                for (menu_id, quantity) in lines {
                    stmt.execute(params![order_id, menu_id, quantity])?;
                }
            }
            tx.commit()?;
            Ok(order_id)
        })
    }

    pub fn get_order(&self, id: i64) -> Result<Option<OrderRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, status, created_at FROM orders WHERE id = ?1",
                [id],
                map_order,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// All orders, or only those owned by `user_id`, ordered by id.
    pub fn list_orders(&self, user_id: Option<i64>) -> Result<Vec<OrderRow>> {
        self.with_conn(|conn| {
            let (sql, filter) = match user_id {
                Some(uid) => (
                    "SELECT id, user_id, status, created_at FROM orders WHERE user_id = ?1 ORDER BY id",
                    vec![uid],
                ),
                None => (
                    "SELECT id, user_id, status, created_at FROM orders ORDER BY id",
                    vec![],
                ),
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(filter.iter()), map_order)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch the lines of a set of orders. Ids are bound in chunks of
    /// [`ITEM_BATCH`] to stay under SQLite's host-parameter limit.
    pub fn get_items_for_orders(&self, order_ids: &[i64]) -> Result<Vec<OrderItemRow>> {
        if order_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut rows = Vec::new();
            for chunk in order_ids.chunks(ITEM_BATCH) {
                let placeholders: Vec<String> =
                    (1..=chunk.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "SELECT id, order_id, menu_id, quantity FROM order_items WHERE order_id IN ({}) ORDER BY id",
                    placeholders.join(", ")
                );

                let mut stmt = conn.prepare(&sql)?;
                let batch = stmt
                    .query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
                        Ok(OrderItemRow {
                            id: row.get(0)?,
                            order_id: row.get(1)?,
                            menu_id: row.get(2)?,
                            quantity: row.get(3)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows.extend(batch);
            }

            rows.sort_by_key(|r| r.id);
            Ok(rows)
        })
    }

    /// Compare-and-swap on an order's status. Returns false when the order is
    /// missing or its status is no longer `expected`.
    pub fn swap_order_status(&self, id: i64, expected: &str, new_status: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2",
                params![id, expected, new_status],
            )?;
            Ok(changed == 1)
        })
    }

    /// Unconditional status overwrite. Returns false when the order is missing.
    pub fn set_order_status(&self, id: i64, new_status: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?2 WHERE id = ?1",
                params![id, new_status],
            )?;
            Ok(changed == 1)
        })
    }
}

fn query_menu_item(conn: &Connection, id: i64) -> Result<Option<MenuItemRow>> {
    let row = conn
        .query_row(
            "SELECT id, name, description, price FROM menu_items WHERE id = ?1",
            [id],
            map_menu_item,
        )
        .optional()?;
    Ok(row)
}

fn map_menu_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MenuItemRow> {
    Ok(MenuItemRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
    })
}

fn map_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
    })
}
