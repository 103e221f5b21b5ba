use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use bistro_types::models::{Order, OrderStatus};

use crate::catalog::CatalogReference;
use crate::error::OrderError;
use crate::store::OrderStore;

/// One requested line of a new order. Quantity is taken as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub menu_id: i64,
    pub quantity: i64,
}

/// The order state machine.
///
/// `pending` is the only state an owner can leave (to `cancelled`). Admins
/// may overwrite the status of any order with any non-blank label.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogReference>,
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn OrderStore>, catalog: Arc<dyn CatalogReference>) -> Self {
        Self { store, catalog }
    }

    /// Validate every referenced menu item, then persist the order and its
    /// lines in one step. Nothing is written if any reference is unknown.
    pub async fn create(&self, owner_id: i64, lines: &[NewOrderLine]) -> Result<i64, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let distinct: BTreeSet<i64> = lines.iter().map(|l| l.menu_id).collect();
        for menu_id in distinct {
            if self.catalog.find(menu_id).await?.is_none() {
                debug!("Order by {} references unknown menu id {}", owner_id, menu_id);
                return Err(OrderError::UnknownMenuItem(menu_id));
            }
        }

        let rows: Vec<(i64, i64)> = lines.iter().map(|l| (l.menu_id, l.quantity)).collect();
        let line_count = rows.len();
        let store = self.store.clone();
        let order_id = tokio::task::spawn_blocking(move || store.insert(owner_id, &rows))
            .await
            .map_err(anyhow::Error::from)??;

        info!("Order {} created by {} ({} lines)", order_id, owner_id, line_count);
        Ok(order_id)
    }

    pub fn get(&self, order_id: i64) -> Result<Order, OrderError> {
        self.store
            .find(order_id)?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Owner-triggered `pending -> cancelled`.
    pub fn cancel(&self, order_id: i64, caller_id: i64) -> Result<(), OrderError> {
        let order = self.get(order_id)?;
        if order.user_id != caller_id {
            return Err(OrderError::NotOwner);
        }
        if !order.status.is_pending() {
            return Err(OrderError::InvalidTransition(order.status));
        }

        let swapped = self
            .store
            .swap_status(order_id, &OrderStatus::Pending, &OrderStatus::Cancelled)?;
        if !swapped {
            // Lost a race: someone moved the order on between read and write.
            let current = self.get(order_id)?.status;
            return Err(OrderError::InvalidTransition(current));
        }

        info!("Order {} cancelled by owner {}", order_id, caller_id);
        Ok(())
    }

    pub fn list_mine(&self, owner_id: i64) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list(Some(owner_id))?)
    }

    pub fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list(None)?)
    }

    /// Admin overwrite. Any non-blank label is accepted regardless of the
    /// current status.
    pub fn set_status(&self, order_id: i64, new_status: &str) -> Result<OrderStatus, OrderError> {
        let label = new_status.trim();
        if label.is_empty() {
            return Err(OrderError::EmptyStatus);
        }

        let status = OrderStatus::from(label);
        if !self.store.overwrite_status(order_id, &status)? {
            return Err(OrderError::NotFound(order_id));
        }

        info!("Order {} status set to {}", order_id, status);
        Ok(status)
    }
}
