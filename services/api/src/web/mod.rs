pub mod auth;
pub mod rest;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use auth::{login_handler, logout_handler, request_sign_in_handler, signup_handler};
use rest::{
    add_pin_handler, create_map_handler, delete_map_handler, delete_pin_handler,
    select_map_handler, state_handler,
};
use state::AppState;

/// Builds the API router. Layers such as CORS are added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(state_handler))
        .route("/maps", post(create_map_handler))
        .route("/maps/{id}", delete(delete_map_handler))
        .route("/maps/{id}/select", post(select_map_handler))
        .route("/pins", post(add_pin_handler))
        .route("/pins/{id}", delete(delete_pin_handler))
        .route("/auth/sign-in", post(request_sign_in_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .with_state(state)
}
