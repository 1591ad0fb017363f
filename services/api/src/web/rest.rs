//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the map and pin endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every mutation answers with the full renderable state, so the client can
//! re-render from a single response.

use crate::web::auth::{self, AuthResponse, CredentialsRequest};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use figure8_core::{PinDraft, StoreError, ViewState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        state_handler,
        create_map_handler,
        delete_map_handler,
        select_map_handler,
        add_pin_handler,
        delete_pin_handler,
        auth::request_sign_in_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
    ),
    components(
        schemas(CreateMapRequest, AddPinRequest, CredentialsRequest, AuthResponse)
    ),
    tags(
        (name = "Figure8 Maps API", description = "Maps and pins of the signed-in user.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Renderable state plus whether the client should show the sign-in form.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    #[serde(flatten)]
    pub view: ViewState,
    pub sign_in_requested: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateMapRequest {
    pub name: String,
}

/// The pin-entry form. Coordinates are sent as typed.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPinRequest {
    pub name: String,
    pub lat: String,
    pub lng: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hike_length: Option<String>,
    #[serde(default)]
    pub reservation_required: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<AddPinRequest> for PinDraft {
    fn from(req: AddPinRequest) -> Self {
        PinDraft {
            name: req.name,
            lat: req.lat,
            lng: req.lng,
            category: req.category,
            hike_length: req.hike_length,
            reservation_required: req.reservation_required,
            meal_type: req.meal_type,
            notes: req.notes.unwrap_or_default(),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

pub(crate) async fn render(state: &AppState) -> Json<StateResponse> {
    Json(StateResponse {
        view: state.store.view().await,
        sign_in_requested: state.identity.sign_in_requested(),
    })
}

/// Maps a store error onto a status code. Remote failures have already been
/// logged by the store.
pub(crate) fn store_error(e: StoreError) -> (StatusCode, String) {
    let status = match &e {
        StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::PermissionDenied => StatusCode::UNAUTHORIZED,
        StoreError::NoSelection | StoreError::NotLoaded => StatusCode::CONFLICT,
        StoreError::RemoteWrite { .. } | StoreError::SignOut(_) | StoreError::Remote(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    }
    (status, e.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Current maps, selection, background color and markers.
#[utoipa::path(
    get,
    path = "/state",
    responses(
        (status = 200, description = "Renderable state")
    )
)]
pub async fn state_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    render(&state).await
}

/// Create a map for the signed-in user and select it.
#[utoipa::path(
    post,
    path = "/maps",
    request_body = CreateMapRequest,
    responses(
        (status = 201, description = "Map created and selected"),
        (status = 401, description = "Not signed in, a sign-in was requested"),
        (status = 409, description = "Maps are still loading"),
        (status = 422, description = "Empty or duplicate name"),
        (status = 502, description = "The document store rejected the write")
    )
)]
pub async fn create_map_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMapRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.add_map(&req.name).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, render(&state).await))
}

/// Delete a map. Afterwards the first remaining map is selected, if any.
/// Unknown ids leave maps and selection untouched.
#[utoipa::path(
    delete,
    path = "/maps/{id}",
    params(("id" = String, Path, description = "Map id")),
    responses(
        (status = 200, description = "Map deleted"),
        (status = 401, description = "Not signed in, a sign-in was requested"),
        (status = 502, description = "Removed locally, but the document store rejected the delete")
    )
)]
pub async fn delete_map_handler(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let known = state
        .store
        .snapshot()
        .await
        .maps
        .iter()
        .any(|map| map.id == map_id);
    let result = state.store.delete_map(&map_id).await;

    // The store always drops the selection on delete, picking the next one
    // happens here, even when the remote delete failed.
    if known && !matches!(result, Err(StoreError::PermissionDenied)) {
        let first = state.store.snapshot().await.maps.first().map(|map| map.id.clone());
        if let Some(first) = first {
            state.store.select_map(&first).await;
        }
    }

    result.map_err(store_error)?;
    Ok(render(&state).await)
}

/// Select a map from the current list.
#[utoipa::path(
    post,
    path = "/maps/{id}/select",
    params(("id" = String, Path, description = "Map id")),
    responses(
        (status = 200, description = "Map selected"),
        (status = 404, description = "No such map in the current list")
    )
)]
pub async fn select_map_handler(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let known = state
        .store
        .snapshot()
        .await
        .maps
        .iter()
        .any(|map| map.id == map_id);
    if !known {
        return Err((StatusCode::NOT_FOUND, format!("Map {} not found", map_id)));
    }
    state.store.select_map(&map_id).await;
    Ok(render(&state).await)
}

/// Drop a pin on the selected map.
#[utoipa::path(
    post,
    path = "/pins",
    request_body = AddPinRequest,
    responses(
        (status = 201, description = "Pin added"),
        (status = 409, description = "No map is selected"),
        (status = 422, description = "Invalid coordinates, category or option"),
        (status = 502, description = "Added locally, but the document store rejected the write")
    )
)]
pub async fn add_pin_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPinRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let pin = PinDraft::from(req)
        .into_pin()
        .map_err(|e| store_error(e.into()))?;
    state.store.add_pin(pin).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, render(&state).await))
}

/// Delete a pin from the selected map.
#[utoipa::path(
    delete,
    path = "/pins/{id}",
    params(("id" = String, Path, description = "Pin id")),
    responses(
        (status = 200, description = "Pin deleted, or it did not exist"),
        (status = 401, description = "Not signed in, a sign-in was requested"),
        (status = 409, description = "No map is selected"),
        (status = 502, description = "Removed locally, but the document store rejected the write")
    )
)]
pub async fn delete_pin_handler(
    State(state): State<Arc<AppState>>,
    Path(pin_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.delete_pin(&pin_id).await.map_err(store_error)?;
    Ok(render(&state).await)
}
