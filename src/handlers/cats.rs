use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    Extension, Json,
};
use serde_json::{Map, Value};

use super::{caller, json_body};
use crate::auth::Identity;
use crate::error::ApiError;
use crate::models::{Cat, MessageResponse};
use crate::services::IncomingFile;
use crate::state::AppState;

/// Multipart part carrying the image
const IMAGE_FIELD: &str = "cat";

/// GET /api/v1/cats
pub async fn cat_list(State(state): State<AppState>) -> Result<Json<Vec<Cat>>, ApiError> {
    Ok(Json(state.cats.list().await?))
}

/// GET /api/v1/cats/:id
pub async fn cat_get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Cat>, ApiError> {
    Ok(Json(state.cats.get(&id).await?))
}

/// GET /api/v1/users/:id/cats
pub async fn cats_by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Cat>>, ApiError> {
    Ok(Json(state.cats.list_by_owner(&id).await?))
}

/// POST /api/v1/cats - multipart text fields plus an optional `cat` file part
pub async fn cat_post(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    let form = form.map_err(|rejection| ApiError::invalid_body(rejection.body_text()))?;
    let (payload, image) = read_cat_form(form).await?;

    Ok(Json(state.cats.create(&identity, payload, image).await?))
}

/// PUT /api/v1/cats/:id
pub async fn cat_put(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    let payload = json_body(body)?;
    Ok(Json(state.cats.update(&identity, &id, payload).await?))
}

/// DELETE /api/v1/cats/:id
pub async fn cat_delete(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = caller(identity)?;
    Ok(Json(state.cats.delete(&identity, &id).await?))
}

/// Collect text parts into a JSON object and keep the image part aside
async fn read_cat_form(mut form: Multipart) -> Result<(Value, Option<IncomingFile>), ApiError> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_body(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let original_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::invalid_body(e.body_text()))?;
            // Browsers send an empty part when no file was chosen
            if !bytes.is_empty() {
                image = Some(IncomingFile {
                    original_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_body(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }
    }

    Ok((Value::Object(fields), image))
}
