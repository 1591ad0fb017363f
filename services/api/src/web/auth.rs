//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: requesting an interactive sign-in, signup, login
//! and logout. A successful signup or login makes the account the principal of
//! the process-wide session and reloads its maps.

use crate::web::rest::{render, store_error};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use figure8_core::{Identity, PortError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

const MIN_PASSWORD_LENGTH: usize = 8;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub uid: String,
    pub email: Option<String>,
}

impl From<Identity> for AuthResponse {
    fn from(identity: Identity) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
        }
    }
}

fn validate(req: &CredentialsRequest) -> Result<(), (StatusCode, String)> {
    if !req.email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "Invalid email address".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

fn port_error(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::Conflict(message) => (StatusCode::CONFLICT, message),
        PortError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        other => {
            error!("Authentication failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication error".to_string(),
            )
        }
    }
}

/// Loads the new principal's maps before answering. A failed load is logged
/// and left to the background sync, the sign-in itself stands.
async fn load_maps(state: &AppState) {
    if let Err(e) = state.store.refresh().await {
        warn!("Signed in, but loading maps failed: {}", e);
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/sign-in - Ask the client to present the sign-in form
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    responses(
        (status = 202, description = "Sign-in requested, see `signInRequested` in /state")
    )
)]
pub async fn request_sign_in_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.session().request_sign_in().await;
    (StatusCode::ACCEPTED, render(&state).await)
}

/// POST /auth/signup - Create a new account and sign it in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Account already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate(&req)?;
    let identity = state
        .identity
        .sign_up(&req.email, &req.password)
        .await
        .map_err(port_error)?;
    load_maps(&state).await;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(identity))))
}

/// POST /auth/login - Sign in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let identity = state
        .identity
        .log_in(&req.email, &req.password)
        .await
        .map_err(port_error)?;
    load_maps(&state).await;
    Ok(Json(AuthResponse::from(identity)))
}

/// POST /auth/logout - Sign out and fall back to the example map
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 502, description = "The identity provider rejected the sign-out")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.sign_out().await.map_err(store_error)?;
    Ok(render(&state).await)
}
