use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{CatStore, HealthCheck, StoreError, UserStore};
use crate::models::{Cat, Owner, PostCat, PostUser, PutCat, PutUser, User, UserView};

/// Cat row as persisted; the owner is resolved on read
#[derive(Debug, Clone)]
struct CatRow {
    cat_name: String,
    weight: f64,
    owner: i64,
    filename: String,
    birthdate: NaiveDate,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    cats: BTreeMap<i64, CatRow>,
    last_user_id: i64,
    last_cat_id: i64,
}

impl Tables {
    fn cat(&self, cat_id: i64, row: &CatRow, owner: Owner) -> Cat {
        Cat {
            cat_id,
            cat_name: row.cat_name.clone(),
            weight: row.weight,
            owner,
            filename: row.filename.clone(),
            birthdate: row.birthdate,
            lat: row.lat,
            lng: row.lng,
        }
    }

    fn resolved_cat(&self, cat_id: i64, row: &CatRow) -> Cat {
        let owner = match self.users.get(&row.owner) {
            Some(user) => Owner::Resolved(UserView::from(user.clone())),
            None => Owner::Id(row.owner),
        };
        self.cat(cat_id, row, owner)
    }

    fn name_or_email_taken(&self, except: Option<i64>, user_name: Option<&str>, email: Option<&str>) -> bool {
        self.users.values().any(|u| {
            Some(u.user_id) != except
                && (user_name == Some(u.user_name.as_str())
                    || (email.is_some() && email == u.email.as_deref()))
        })
    }
}

/// In-process store with the same semantics as the PostgreSQL schema:
/// unique user names and emails, cats require an existing owner, and
/// deleting a user deletes their cats.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Cat>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cats
            .iter()
            .map(|(id, row)| tables.resolved_cat(*id, row))
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Cat>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.cats.get(&id).map(|row| tables.resolved_cat(id, row)))
    }

    async fn get_by_owner(&self, owner_id: i64) -> Result<Vec<Cat>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cats
            .iter()
            .filter(|(_, row)| row.owner == owner_id)
            .map(|(id, row)| tables.cat(*id, row, Owner::Id(owner_id)))
            .collect())
    }

    async fn insert(&self, cat: &PostCat) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&cat.owner) {
            return Ok(None);
        }

        tables.last_cat_id += 1;
        let id = tables.last_cat_id;
        tables.cats.insert(
            id,
            CatRow {
                cat_name: cat.cat_name.clone(),
                weight: cat.weight,
                owner: cat.owner,
                filename: cat.filename.clone(),
                birthdate: cat.birthdate,
                lat: cat.lat,
                lng: cat.lng,
            },
        );
        Ok(Some(id))
    }

    async fn update(&self, id: i64, changes: &PutCat) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.cats.get_mut(&id) else {
            return Ok(0);
        };

        if let Some(cat_name) = &changes.cat_name {
            row.cat_name = cat_name.clone();
        }
        if let Some(weight) = changes.weight {
            row.weight = weight;
        }
        if let Some(birthdate) = changes.birthdate {
            row.birthdate = birthdate;
        }
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.cats.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn insert(&self, user: &PostUser) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.name_or_email_taken(None, Some(user.user_name.as_str()), user.email.as_deref()) {
            return Ok(None);
        }

        tables.last_user_id += 1;
        let user_id = tables.last_user_id;
        tables.users.insert(
            user_id,
            User {
                user_id,
                user_name: user.user_name.clone(),
                email: user.email.clone(),
                role: user.role,
                password: user.password.clone(),
            },
        );
        Ok(Some(user_id))
    }

    async fn update(&self, id: i64, changes: &PutUser) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(0);
        }
        if tables.name_or_email_taken(Some(id), changes.user_name.as_deref(), changes.email.as_deref()) {
            return Err(StoreError::Conflict("value already in use".to_string()));
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(user_name) = &changes.user_name {
            user.user_name = user_name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = Some(email.clone());
        }
        if let Some(password) = &changes.password {
            user.password = password.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(0);
        }
        tables.cats.retain(|_, cat| cat.owner != id);
        Ok(1)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn post_user(name: &str, email: Option<&str>) -> PostUser {
        PostUser {
            user_name: name.to_string(),
            email: email.map(str::to_string),
            password: "$argon2id$hash".to_string(),
            role: Role::User,
        }
    }

    fn post_cat(owner: i64) -> PostCat {
        PostCat {
            cat_name: "Fluffy".to_string(),
            weight: 4.0,
            birthdate: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            owner,
            filename: "img.jpg".to_string(),
            lat: 60.1,
            lng: 24.9,
        }
    }

    #[tokio::test]
    async fn duplicate_user_name_or_email_inserts_nothing() {
        let store = MemoryStore::new();
        assert_eq!(UserStore::insert(&store, &post_user("a", Some("a@x.fi"))).await.unwrap(), Some(1));
        assert_eq!(UserStore::insert(&store, &post_user("a", None)).await.unwrap(), None);
        assert_eq!(UserStore::insert(&store, &post_user("b", Some("a@x.fi"))).await.unwrap(), None);
        assert_eq!(UserStore::insert(&store, &post_user("b", None)).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn cat_requires_existing_owner() {
        let store = MemoryStore::new();
        assert_eq!(CatStore::insert(&store, &post_cat(1)).await.unwrap(), None);

        UserStore::insert(&store, &post_user("a", None)).await.unwrap();
        assert_eq!(CatStore::insert(&store, &post_cat(1)).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn reads_resolve_owner_except_by_owner_listing() {
        let store = MemoryStore::new();
        UserStore::insert(&store, &post_user("a", None)).await.unwrap();
        CatStore::insert(&store, &post_cat(1)).await.unwrap();

        let cat = CatStore::get_by_id(&store, 1).await.unwrap().unwrap();
        assert!(matches!(cat.owner, Owner::Resolved(ref u) if u.user_name == "a"));

        let cats = CatStore::get_by_owner(&store, 1).await.unwrap();
        assert_eq!(cats[0].owner, Owner::Id(1));
        assert!(CatStore::get_by_owner(&store, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let store = MemoryStore::new();
        UserStore::insert(&store, &post_user("a", None)).await.unwrap();
        CatStore::insert(&store, &post_cat(1)).await.unwrap();

        let changes = PutCat {
            weight: Some(5.0),
            ..PutCat::default()
        };
        assert_eq!(CatStore::update(&store, 1, &changes).await.unwrap(), 1);
        assert_eq!(CatStore::update(&store, 9, &changes).await.unwrap(), 0);

        let cat = CatStore::get_by_id(&store, 1).await.unwrap().unwrap();
        assert_eq!(cat.weight, 5.0);
        assert_eq!(cat.cat_name, "Fluffy");
    }

    #[tokio::test]
    async fn renaming_onto_taken_name_conflicts() {
        let store = MemoryStore::new();
        UserStore::insert(&store, &post_user("a", None)).await.unwrap();
        UserStore::insert(&store, &post_user("b", None)).await.unwrap();

        let changes = PutUser {
            user_name: Some("a".to_string()),
            ..PutUser::default()
        };
        assert!(matches!(
            UserStore::update(&store, 2, &changes).await,
            Err(StoreError::Conflict(_))
        ));
        // Keeping one's own name is not a conflict
        assert_eq!(UserStore::update(&store, 1, &changes).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_user_removes_their_cats() {
        let store = MemoryStore::new();
        UserStore::insert(&store, &post_user("a", None)).await.unwrap();
        CatStore::insert(&store, &post_cat(1)).await.unwrap();

        assert_eq!(UserStore::delete(&store, 1).await.unwrap(), 1);
        assert_eq!(UserStore::delete(&store, 1).await.unwrap(), 0);
        assert!(CatStore::list(&store).await.unwrap().is_empty());
    }
}
