use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::{caller, json_body};
use crate::auth::Identity;
use crate::error::ApiError;
use crate::models::{MessageResponse, UserView};
use crate::state::AppState;

/// GET /api/v1/users
pub async fn user_list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// GET /api/v1/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UserView>, ApiError> {
    Ok(Json(state.users.get(&id).await?))
}

/// POST /api/v1/users - open registration
pub async fn user_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload = json_body(body)?;
    Ok(Json(state.users.register(payload).await?))
}

/// PUT /api/v1/users - caller updates their own record
pub async fn user_put_current(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    let payload = json_body(body)?;
    Ok(Json(state.users.update_current(&identity, payload).await?))
}

/// DELETE /api/v1/users - caller deletes their own record
pub async fn user_delete_current(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    Ok(Json(state.users.delete_current(&identity).await?))
}

/// PUT /api/v1/users/:id - admin only
pub async fn user_put(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    let payload = json_body(body)?;
    Ok(Json(state.users.update_as_admin(&identity, &id, payload).await?))
}

/// DELETE /api/v1/users/:id - admin only
pub async fn user_delete(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    Ok(Json(state.users.delete_as_admin(&identity, &id).await?))
}

/// GET /api/v1/auth/token - echo the verified identity
pub async fn token_check(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<Identity>, ApiError> {
    let identity = identity.map(|Extension(identity)| identity);
    Ok(Json(state.users.check_identity(identity)?))
}
