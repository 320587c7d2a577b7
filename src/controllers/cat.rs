use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::decode;
use crate::auth::{policy, Identity};
use crate::database::CatStore;
use crate::error::ApiError;
use crate::models::{Cat, MessageResponse, PostCat, PutCat};
use crate::services::{Geolocator, IncomingFile, StoredFile, UploadStore};
use crate::validation::{parse_id, rules};

pub struct CatController {
    store: Arc<dyn CatStore>,
    uploads: Arc<dyn UploadStore>,
    geolocator: Arc<dyn Geolocator>,
    placeholder_filename: String,
}

impl CatController {
    pub fn new(
        store: Arc<dyn CatStore>,
        uploads: Arc<dyn UploadStore>,
        geolocator: Arc<dyn Geolocator>,
        placeholder_filename: impl Into<String>,
    ) -> Self {
        Self {
            store,
            uploads,
            geolocator,
            placeholder_filename: placeholder_filename.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Cat>, ApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Cat, ApiError> {
        let id = parse_id(raw_id)?;
        self.existing(id).await
    }

    /// Cats owned by one user; an unknown owner simply has none
    pub async fn list_by_owner(&self, raw_owner_id: &str) -> Result<Vec<Cat>, ApiError> {
        let owner_id = parse_id(raw_owner_id)?;
        Ok(self.store.get_by_owner(owner_id).await?)
    }

    /// Create a cat owned by the caller. Owner, coordinates and filename come
    /// from the identity and the collaborators, never from the payload.
    pub async fn create(
        &self,
        identity: &Identity,
        payload: Value,
        image: Option<IncomingFile>,
    ) -> Result<MessageResponse, ApiError> {
        rules::cat_create().check(&payload)?;
        let cat: PostCat = decode(payload)?;

        let stored = match &image {
            Some(file) => Some(self.uploads.save(file).await?),
            None => None,
        };

        let id = match self.insert_enriched(identity, cat, stored.as_ref()).await {
            Ok(id) => id,
            Err(err) => {
                if let Some(file) = &stored {
                    self.discard(file).await;
                }
                return Err(err);
            }
        };

        info!("Cat {} added by user {}", id, identity.id);
        Ok(MessageResponse::with_id("cat added", id))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        raw_id: &str,
        payload: Value,
    ) -> Result<MessageResponse, ApiError> {
        let id = parse_id(raw_id)?;
        rules::cat_update().check(&payload)?;
        let changes: PutCat = decode(payload)?;

        let existing = self.existing(id).await?;
        policy::ensure(
            policy::can_mutate_cat(identity, existing.owner.id()),
            "Only the owner or an admin can modify this cat",
        )?;

        // Not atomic with the owner read above: a concurrent owner change goes unnoticed
        if self.store.update(id, &changes).await? == 0 {
            return Err(Self::not_found(id));
        }

        info!("Cat {} updated by user {}", id, identity.id);
        Ok(MessageResponse::with_id("cat updated", id))
    }

    pub async fn delete(&self, identity: &Identity, raw_id: &str) -> Result<MessageResponse, ApiError> {
        let id = parse_id(raw_id)?;

        let existing = self.existing(id).await?;
        policy::ensure(
            policy::can_delete_cat(identity, existing.owner.id()),
            "Only the owner or an admin can delete this cat",
        )?;

        if self.store.delete(id).await? == 0 {
            return Err(Self::not_found(id));
        }

        info!("Cat {} deleted by user {}", id, identity.id);
        Ok(MessageResponse::with_id("cat deleted", id))
    }

    async fn insert_enriched(
        &self,
        identity: &Identity,
        mut cat: PostCat,
        stored: Option<&StoredFile>,
    ) -> Result<i64, ApiError> {
        let coordinates = self.geolocator.locate(stored).await?;

        cat.owner = identity.id;
        cat.lat = coordinates.lat;
        cat.lng = coordinates.lng;
        cat.filename = stored
            .map(|file| file.filename.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.placeholder_filename.clone());

        self.store
            .insert(&cat)
            .await?
            .ok_or_else(|| ApiError::insertion("no cat inserted"))
    }

    /// Drop an upload whose cat was never stored
    async fn discard(&self, file: &StoredFile) {
        if let Err(e) = self.uploads.remove(file).await {
            warn!("Failed to remove orphaned upload {}: {}", file.filename, e);
        }
    }

    async fn existing(&self, id: i64) -> Result<Cat, ApiError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::not_found(format!("cat {} not found", id))
    }
}
