use thiserror::Error;

use bistro_types::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,
    #[error("menu id {0} not found")]
    UnknownMenuItem(i64),
    #[error("order {0} not found")]
    NotFound(i64),
    #[error("not owner")]
    NotOwner,
    #[error("cannot cancel at this stage (status is {0})")]
    InvalidTransition(OrderStatus),
    #[error("status must not be empty")]
    EmptyStatus,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
