//! Shipping Models
//! Mission: Define shipping order records and API payloads

use serde::{Deserialize, Serialize};

/// A stored shipping order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingOrder {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub description: String,
    pub weight: f64,
    pub created_at: String,
}

/// Create request. `weight` arrives as a JSON number or a numeric string
/// depending on the client, so it is coerced during validation.
#[derive(Debug, Deserialize)]
pub struct CreateShippingRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub description: Option<String>,
    pub weight: Option<serde_json::Value>,
}

/// Validated fields ready for insertion
#[derive(Debug)]
pub struct NewShippingOrder {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub description: String,
    pub weight: f64,
}

/// 201 body for a created order
#[derive(Debug, Serialize)]
pub struct ShippingCreatedResponse {
    pub success: bool,
    pub message: String,
    pub shipping: ShippingOrder,
}

/// Caller's own orders, newest first
#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub success: bool,
    pub count: usize,
    pub shippings: Vec<ShippingOrder>,
}

/// Single order looked up by its owner
#[derive(Debug, Serialize)]
pub struct ShippingResponse {
    pub success: bool,
    pub shipping: ShippingOrder,
}

/// Every order in the system
#[derive(Debug, Serialize)]
pub struct AllOrdersResponse {
    pub success: bool,
    pub count: usize,
    pub orders: Vec<ShippingOrder>,
}

/// Single order from the cross-user search
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: ShippingOrder,
}
