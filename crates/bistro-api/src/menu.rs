use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use bistro_auth::{Gate, TokenValidator, authorize};
use bistro_db::Database;
use bistro_types::api::{ActionResponse, MenuItemRequest, MenuItemResponse, PingResponse};
use bistro_types::models::MenuItem;

use crate::error::ApiError;

pub type MenuState = Arc<MenuStateInner>;

pub struct MenuStateInner {
    pub db: Arc<Database>,
}

/// Public reads, admin-only writes.
pub fn router(state: MenuState, validator: Arc<TokenValidator>) -> Router {
    let public_routes = Router::new()
        .route("/", get(list_items))
        .route("/ping", get(ping))
        .route("/{id}", get(get_item))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/add", post(add_item))
        .route("/edit/{id}", put(edit_item))
        .route("/delete/{id}", delete(delete_item))
        .layer(middleware::from_fn_with_state(Gate::admin(validator), authorize))
        .with_state(state);

    Router::new().merge(public_routes).merge(admin_routes)
}

fn validate(req: &MenuItemRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() || req.price <= 0.0 {
        return Err(ApiError::Validation("invalid payload".into()));
    }
    Ok(())
}

pub async fn list_items(State(state): State<MenuState>) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<MenuItem> = state
        .db
        .list_menu_items()
        .map_err(|e| ApiError::internal("menu lookup failed", e))?
        .into_iter()
        .map(MenuItem::from)
        .collect();
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<MenuState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .db
        .get_menu_item(id)
        .map_err(|e| ApiError::internal("menu lookup failed", e))?
        .ok_or_else(|| ApiError::NotFound("menu not found".into()))?;
    Ok(Json(MenuItem::from(item)))
}

pub async fn add_item(
    State(state): State<MenuState>,
    WithRejection(Json(req), _): WithRejection<Json<MenuItemRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req)?;

    let row = state
        .db
        .insert_menu_item(req.name.trim(), &req.description, req.price)
        .map_err(|e| ApiError::internal("menu insert failed", e))?;

    info!("Menu item {} added: {}", row.id, row.name);
    Ok((
        StatusCode::CREATED,
        Json(MenuItemResponse {
            status: "success".into(),
            message: "Menu item added".into(),
            menu: row.into(),
        }),
    ))
}

pub async fn edit_item(
    State(state): State<MenuState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<MenuItemRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req)?;

    let row = state
        .db
        .update_menu_item(id, req.name.trim(), &req.description, req.price)
        .map_err(|e| ApiError::internal("menu update failed", e))?
        .ok_or_else(|| ApiError::NotFound("menu not found".into()))?;

    info!("Menu item {} updated", id);
    Ok(Json(MenuItemResponse {
        status: "success".into(),
        message: "Menu item updated".into(),
        menu: row.into(),
    }))
}

pub async fn delete_item(
    State(state): State<MenuState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .delete_menu_item(id)
        .map_err(|e| ApiError::internal("menu delete failed", e))?;
    if !deleted {
        return Err(ApiError::NotFound("menu not found".into()));
    }

    info!("Menu item {} deleted", id);
    Ok(Json(ActionResponse::success("Menu item deleted")))
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "menu ok".into(),
    })
}
