use async_trait::async_trait;
use sqlx::{postgres::PgRow, Row};

use super::{CatStore, PgStore, StoreError};
use crate::models::{Cat, Owner, PostCat, PutCat, Role, UserView};

const SELECT_RESOLVED: &str = r#"
    SELECT c.cat_id, c.cat_name, c.weight, c.owner, c.filename, c.birthdate, c.lat, c.lng,
           u.user_name, u.email, u.role
    FROM cats c
    JOIN users u ON u.user_id = c.owner
"#;

fn cat_from_row(row: &PgRow, owner: Owner) -> Result<Cat, StoreError> {
    Ok(Cat {
        cat_id: row.try_get("cat_id")?,
        cat_name: row.try_get("cat_name")?,
        weight: row.try_get("weight")?,
        owner,
        filename: row.try_get("filename")?,
        birthdate: row.try_get("birthdate")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
    })
}

/// Row from [`SELECT_RESOLVED`], owner joined in
fn resolved_cat(row: &PgRow) -> Result<Cat, StoreError> {
    let role: String = row.try_get("role")?;
    let owner = UserView {
        user_id: row.try_get("owner")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        role: role.parse::<Role>().map_err(StoreError::Corrupt)?,
    };
    cat_from_row(row, Owner::Resolved(owner))
}

#[async_trait]
impl CatStore for PgStore {
    async fn list(&self) -> Result<Vec<Cat>, StoreError> {
        let sql = format!("{} ORDER BY c.cat_id", SELECT_RESOLVED);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(resolved_cat).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Cat>, StoreError> {
        let sql = format!("{} WHERE c.cat_id = $1", SELECT_RESOLVED);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(resolved_cat).transpose()
    }

    async fn get_by_owner(&self, owner_id: i64) -> Result<Vec<Cat>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT cat_id, cat_name, weight, owner, filename, birthdate, lat, lng
            FROM cats
            WHERE owner = $1
            ORDER BY cat_id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| cat_from_row(row, Owner::Id(owner_id)))
            .collect()
    }

    async fn insert(&self, cat: &PostCat) -> Result<Option<i64>, StoreError> {
        // Nothing is written unless the owner exists
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO cats (cat_name, weight, owner, filename, birthdate, lat, lng)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE EXISTS (SELECT 1 FROM users WHERE user_id = $3)
            RETURNING cat_id
            "#,
        )
        .bind(&cat.cat_name)
        .bind(cat.weight)
        .bind(cat.owner)
        .bind(&cat.filename)
        .bind(cat.birthdate)
        .bind(cat.lat)
        .bind(cat.lng)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(id)
    }

    async fn update(&self, id: i64, changes: &PutCat) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cats SET
                cat_name = COALESCE($1, cat_name),
                weight = COALESCE($2, weight),
                birthdate = COALESCE($3, birthdate)
            WHERE cat_id = $4
            "#,
        )
        .bind(&changes.cat_name)
        .bind(changes.weight)
        .bind(changes.birthdate)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cats WHERE cat_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
