//! Authorization decisions.
//!
//! Every function here is pure: it looks only at the caller's identity and the
//! owner or target of the action. Controllers call [`ensure`] before any
//! mutating store call.

use super::Identity;
use crate::error::ApiError;
use crate::models::Role;

pub fn is_admin(identity: &Identity) -> bool {
    identity.role == Role::Admin
}

pub fn can_mutate_user(identity: &Identity, target_user_id: i64) -> bool {
    is_admin(identity) || identity.id == target_user_id
}

pub fn can_mutate_cat(identity: &Identity, cat_owner_id: i64) -> bool {
    is_admin(identity) || identity.id == cat_owner_id
}

pub fn can_delete_cat(identity: &Identity, cat_owner_id: i64) -> bool {
    can_mutate_cat(identity, cat_owner_id)
}

/// Deleting another user's account. Deleting one's own account is a separate
/// action that needs no role.
pub fn can_delete_user(identity: &Identity) -> bool {
    is_admin(identity)
}

/// Turn a denied decision into a 403
pub fn ensure(allowed: bool, message: &str) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}
