use crate::auth::repo_types::{NewUser, User};
use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Store-level failure. `Duplicate` is the unique-index loser under a
/// concurrent insert race; everything else is opaque infrastructure failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate email")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Repository interface over the user table.
///
/// Email comparisons are case-insensitive; stored emails keep their original
/// casing. Uniqueness is enforced by the store (unique index on
/// `LOWER(email)`), not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    async fn attach_google_id(&self, id: Uuid, google_id: &str) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        // 23505: unique_violation
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Duplicate;
        }
    }
    StoreError::Other(e.into())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, google_id, profile_picture, role, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, google_id, profile_picture, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, google_id, profile_picture, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, google_id, profile_picture, role, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.google_id)
        .bind(&new.profile_picture)
        .bind(new.role)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn attach_google_id(&self, id: Uuid, google_id: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET google_id = $2
            WHERE id = $1
            RETURNING id, name, email, password_hash, google_id, profile_picture, role, created_at
            "#,
        )
        .bind(id)
        .bind(google_id)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }
}
