use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::WithRejection;

use bistro_auth::{Gate, Principal, TokenValidator, authorize};
use bistro_orders::{NewOrderLine, OrderLifecycle};
use bistro_types::api::{
    ActionResponse, CreateOrderRequest, CreateOrderResponse, PingResponse, UpdateStatusRequest,
};

use crate::error::ApiError;

pub type OrderState = Arc<OrderStateInner>;

pub struct OrderStateInner {
    pub lifecycle: OrderLifecycle,
}

pub fn router(state: OrderState, validator: Arc<TokenValidator>) -> Router {
    let member_routes = Router::new()
        .route("/create", post(create_order))
        .route("/my", get(my_orders))
        .route("/cancel/{id}", delete(cancel_order))
        .layer(middleware::from_fn_with_state(Gate::any(validator.clone()), authorize))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin", get(all_orders))
        .route("/admin/update-status/{id}", put(update_status))
        .layer(middleware::from_fn_with_state(Gate::admin(validator), authorize))
        .with_state(state);

    Router::new()
        .route("/ping", get(ping))
        .merge(member_routes)
        .merge(admin_routes)
}

pub async fn create_order(
    State(state): State<OrderState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(req), _): WithRejection<Json<CreateOrderRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let lines: Vec<NewOrderLine> = req
        .items
        .iter()
        .map(|item| NewOrderLine {
            menu_id: item.menu_id,
            quantity: item.quantity,
        })
        .collect();

    let order_id = state.lifecycle.create(principal.subject_id, &lines).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            status: "success".into(),
            message: "Order created".into(),
            order_id,
        }),
    ))
}

pub async fn my_orders(
    State(state): State<OrderState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    // Run the blocking DB reads off the async runtime
    let lifecycle = state.lifecycle.clone();
    let orders =
        tokio::task::spawn_blocking(move || lifecycle.list_mine(principal.subject_id)).await??;
    Ok(Json(orders))
}

pub async fn cancel_order(
    State(state): State<OrderState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let lifecycle = state.lifecycle.clone();
    tokio::task::spawn_blocking(move || lifecycle.cancel(id, principal.subject_id)).await??;
    Ok(Json(ActionResponse::success("Order cancelled")))
}

pub async fn all_orders(State(state): State<OrderState>) -> Result<impl IntoResponse, ApiError> {
    let lifecycle = state.lifecycle.clone();
    let orders = tokio::task::spawn_blocking(move || lifecycle.list_all()).await??;
    Ok(Json(orders))
}

pub async fn update_status(
    State(state): State<OrderState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateStatusRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let lifecycle = state.lifecycle.clone();
    tokio::task::spawn_blocking(move || lifecycle.set_status(id, &req.status)).await??;
    Ok(Json(ActionResponse::success("Order status updated")))
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "order ok".into(),
    })
}
