//! Shipping API Endpoints
//! Mission: CRUD surface for shipping orders behind the session gate

use crate::auth::models::User;
use crate::error::ApiError;
use crate::shipping::models::{
    AllOrdersResponse, CreateShippingRequest, MyOrdersResponse, OrderResponse,
    ShippingCreatedResponse, ShippingResponse,
};
use crate::state::AppState;
use crate::validate::validate_shipping;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::info;

/// Create order - POST /api/v1/shipping/create
pub async fn create_shipping(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateShippingRequest>,
) -> Result<Response, ApiError> {
    let new_order = validate_shipping(&payload).map_err(ApiError::Validation)?;

    let shipping = state.shipping.create(user.id, new_order)?;

    info!("📦 Shipping order {} created by {}", shipping.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(ShippingCreatedResponse {
            success: true,
            message: "Shipping order created successfully".to_string(),
            shipping,
        }),
    )
        .into_response())
}

/// Caller's orders - GET /api/v1/shipping/my-orders
pub async fn get_user_shippings(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<MyOrdersResponse>, ApiError> {
    let shippings = state.shipping.for_user(user.id)?;

    Ok(Json(MyOrdersResponse {
        success: true,
        count: shippings.len(),
        shippings,
    }))
}

/// Own order by id - GET /api/v1/shipping/:id
/// Scoped to the caller, so someone else's order is a plain 404.
pub async fn get_shipping_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(order_id): Path<i64>,
) -> Result<Json<ShippingResponse>, ApiError> {
    let shipping = state
        .shipping
        .find_for_user(order_id, user.id)?
        .ok_or(ApiError::ShippingNotFound)?;

    Ok(Json(ShippingResponse {
        success: true,
        shipping,
    }))
}

/// Every order - GET /api/v1/shipping/all-orders
pub async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<AllOrdersResponse>, ApiError> {
    let orders = state.shipping.all()?;

    Ok(Json(AllOrdersResponse {
        success: true,
        count: orders.len(),
        orders,
    }))
}

/// Cross-user search - GET /api/v1/shipping/search/:id
pub async fn search_order_by_id(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .shipping
        .find_by_id(order_id)?
        .ok_or(ApiError::OrderNotFound)?;

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}
