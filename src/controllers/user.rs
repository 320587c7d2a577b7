use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::decode;
use crate::auth::{policy, Identity};
use crate::database::UserStore;
use crate::error::ApiError;
use crate::models::{MessageResponse, PostUser, PutUser, UserView};
use crate::services::Hasher;
use crate::validation::{parse_id, rules};

pub struct UserController {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn Hasher>,
}

impl UserController {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn Hasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn list(&self) -> Result<Vec<UserView>, ApiError> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, raw_id: &str) -> Result<UserView, ApiError> {
        let id = parse_id(raw_id)?;
        self.store
            .get_by_id(id)
            .await?
            .map(UserView::from)
            .ok_or_else(|| Self::not_found(id))
    }

    /// Open registration. The role is always `user` and only the digest of
    /// the password is persisted.
    pub async fn register(&self, payload: Value) -> Result<MessageResponse, ApiError> {
        rules::user_create().check(&payload)?;
        let mut user: PostUser = decode(payload)?;
        user.password = self.hasher.hash(&user.password).await?;

        let user_id = self
            .store
            .insert(&user)
            .await?
            .ok_or_else(|| ApiError::insertion("no user inserted"))?;

        info!("User {} registered", user_id);
        Ok(MessageResponse::with_user_id("user added", user_id))
    }

    pub async fn update_as_admin(
        &self,
        identity: &Identity,
        raw_id: &str,
        payload: Value,
    ) -> Result<MessageResponse, ApiError> {
        let id = parse_id(raw_id)?;
        rules::user_admin_update().check(&payload)?;
        let changes = self.hashed_changes(payload).await?;

        policy::ensure(policy::is_admin(identity), "Admin only")?;

        self.apply(id, &changes).await?;
        info!("User {} modified by admin {}", id, identity.id);
        Ok(MessageResponse::new("user modified"))
    }

    /// Update the caller's own record. A `role` in the payload is ignored.
    pub async fn update_current(&self, identity: &Identity, mut payload: Value) -> Result<MessageResponse, ApiError> {
        if let Value::Object(fields) = &mut payload {
            fields.remove("role");
        }
        rules::user_update().check(&payload)?;
        let changes = self.hashed_changes(payload).await?;

        policy::ensure(
            policy::can_mutate_user(identity, identity.id),
            "Only the user or an admin can modify this user",
        )?;

        self.apply(identity.id, &changes).await?;
        info!("User {} modified own record", identity.id);
        Ok(MessageResponse::new("user modified"))
    }

    pub async fn delete_as_admin(&self, identity: &Identity, raw_id: &str) -> Result<MessageResponse, ApiError> {
        let id = parse_id(raw_id)?;
        policy::ensure(policy::can_delete_user(identity), "Admin only")?;

        self.remove(id).await?;
        info!("User {} deleted by admin {}", id, identity.id);
        Ok(MessageResponse::new("user deleted"))
    }

    pub async fn delete_current(&self, identity: &Identity) -> Result<MessageResponse, ApiError> {
        self.remove(identity.id).await?;
        info!("User {} deleted own record", identity.id);
        Ok(MessageResponse::new("user deleted"))
    }

    /// Echo the verified identity back to the caller
    pub fn check_identity(&self, identity: Option<Identity>) -> Result<Identity, ApiError> {
        identity.ok_or_else(|| ApiError::forbidden("token not valid"))
    }

    async fn hashed_changes(&self, payload: Value) -> Result<PutUser, ApiError> {
        let mut changes: PutUser = decode(payload)?;
        if let Some(password) = &changes.password {
            changes.password = Some(self.hasher.hash(password).await?);
        }
        Ok(changes)
    }

    async fn apply(&self, id: i64, changes: &PutUser) -> Result<(), ApiError> {
        if self.store.update(id, changes).await? == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn remove(&self, id: i64) -> Result<(), ApiError> {
        if self.store.delete(id).await? == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::not_found(format!("user {} not found", id))
    }
}
