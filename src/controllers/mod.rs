//! Per-resource request orchestration.
//!
//! Each operation runs the same pipeline: validate the untrusted input, enrich
//! it from side channels, resolve whatever the authorization decision needs,
//! authorize, then call the store. Any step may fail with an [`ApiError`];
//! nothing is written to the store unless every earlier step succeeded.
//!
//! [`ApiError`]: crate::error::ApiError

pub mod cat;
pub mod user;

pub use cat::CatController;
pub use user::UserController;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Deserialize an already validated payload
fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| ApiError::invalid_body(e.to_string()))
}
