//! HTTP adapters: extract path, body and identity, then hand off to a controller.

pub mod cats;
pub mod health;
pub mod users;

use axum::{
    extract::rejection::JsonRejection,
    Extension, Json,
};
use serde_json::Value;

use crate::auth::Identity;
use crate::error::ApiError;

/// Identity attached by the middleware, or 403
pub(crate) fn caller(identity: Option<Extension<Identity>>) -> Result<Identity, ApiError> {
    identity
        .map(|Extension(identity)| identity)
        .ok_or_else(|| ApiError::forbidden("token not valid"))
}

pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_body(rejection.body_text()))
}
