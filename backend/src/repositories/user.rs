//! User repository for database operations

use super::{classify, CreateUser, StoreResult, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use technotes_shared::User;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            roles: r.roles,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, roles, active, created_at, updated_at";

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_optional(&self, sql: &str, value: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, UserRecord>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        Ok(user.map(User::from))
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(users.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        Ok(user.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.fetch_optional(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"),
            username,
        )
        .await
    }

    async fn find_by_username_ci(&self, username: &str) -> StoreResult<Option<User>> {
        self.fetch_optional(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1)"),
            username,
        )
        .await
    }

    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (username, password_hash, roles)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.roles)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(user.into())
    }

    async fn update(&self, user: &User) -> StoreResult<Option<User>> {
        let updated = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                username = $2,
                password_hash = $3,
                roles = $4,
                active = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.roles)
        .bind(user.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        Ok(updated.map(User::from))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::health_check(&self.pool).await?;
        Ok(())
    }
}
