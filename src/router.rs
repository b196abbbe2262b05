//! HTTP route table and layer wiring for the API server.

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::auth::{
    api as auth_api, authenticate, authenticate_optional, middleware::ADMIN_ONLY, require_role,
};
use crate::middleware::request_logging;
use crate::shipping::api as shipping_api;
use crate::state::AppState;

/// Build the application router with all routes and layers
pub fn router(state: AppState) -> Result<Router> {
    let open_routes = Router::new()
        .route("/register-user", post(auth_api::register_user))
        .route("/login", post(auth_api::login))
        .route("/forgot-password", post(auth_api::forgot_password))
        .route("/reset-password/:token", post(auth_api::reset_password));

    // Admin bootstrap: open until the first admin exists, so a session is
    // resolved when present but never required
    let bootstrap_routes = Router::new()
        .route("/register-admin", post(auth_api::register_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate_optional,
        ));

    // Layers run outermost-last, so authenticate is added after the role
    // check to run before it
    let admin_routes = Router::new()
        .route("/register", post(auth_api::register))
        .route_layer(middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let shipping_routes = Router::new()
        .route("/shipping/create", post(shipping_api::create_shipping))
        .route("/shipping/my-orders", get(shipping_api::get_user_shippings))
        .route("/shipping/all-orders", get(shipping_api::get_all_orders))
        .route("/shipping/search/:id", get(shipping_api::search_order_by_id))
        .route("/shipping/:id", get(shipping_api::get_shipping_by_id))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .merge(open_routes)
        .merge(bootstrap_routes)
        .merge(admin_routes)
        .merge(shipping_routes);

    // The frontend sends the session cookie, so the origin must be exact
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .frontend_url
                .parse::<HeaderValue>()
                .context("Invalid FRONTEND_URL")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(cors))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "🚀 Shipway backend operational"
}
