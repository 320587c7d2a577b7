use async_trait::async_trait;
use sqlx::{postgres::PgRow, Row};

use super::{PgStore, StoreError, UserStore};
use crate::models::{PostUser, PutUser, Role, User};

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        role: role.parse::<Role>().map_err(StoreError::Corrupt)?,
        password: row.try_get("password")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, user_name, email, role, password FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, user_name, email, role, password FROM users WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: &PostUser) -> Result<Option<i64>, StoreError> {
        // A taken user_name or email inserts nothing
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (user_name, email, role, password)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i64, changes: &PutUser) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                user_name = COALESCE($1, user_name),
                email = COALESCE($2, email),
                password = COALESCE($3, password),
                role = COALESCE($4, role)
            WHERE user_id = $5
            "#,
        )
        .bind(&changes.user_name)
        .bind(&changes.email)
        .bind(&changes.password)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
