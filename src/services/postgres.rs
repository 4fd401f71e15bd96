use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{NewUser, ProfileUpdate, User, UserProfile};
use crate::services::users::{normalize_email, StoreError, UserStore};

/// PostgreSQL-backed user store
///
/// Expects these tables to exist:
///
/// ```sql
/// users(id uuid primary key, name text, email text unique, password_hash text,
///       created_at timestamptz, updated_at timestamptz)
/// user_profiles(user_id uuid primary key references users(id), name text,
///       contact_number text, address text, dob date, skills text[],
///       interests text[], updated_at timestamptz)
/// ```
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn profile_from_row(row: &PgRow) -> UserProfile {
    UserProfile {
        user_id: row.get("user_id"),
        name: row.get("name"),
        contact_number: row.get("contact_number"),
        address: row.get("address"),
        dob: row.get("dob"),
        skills: row.get("skills"),
        interests: row.get("interests"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let email = normalize_email(&user.email);
        let query = r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id, name, email, password_hash, created_at, updated_at
        "#;

        let result = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => {
                tracing::debug!("Created user {}", email);
                Ok(user_from_row(&row))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::Conflict(email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
        "#;

        let row = sqlx::query(query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE email = $1
        "#;

        let result = sqlx::query(query)
            .bind(normalize_email(email))
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let query = r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn save_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, StoreError> {
        let query = r#"
            INSERT INTO user_profiles
                (user_id, name, contact_number, address, dob, skills, interests, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                name = COALESCE(EXCLUDED.name, user_profiles.name),
                contact_number = COALESCE(EXCLUDED.contact_number, user_profiles.contact_number),
                address = COALESCE(EXCLUDED.address, user_profiles.address),
                dob = COALESCE(EXCLUDED.dob, user_profiles.dob),
                skills = EXCLUDED.skills,
                interests = EXCLUDED.interests,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, name, contact_number, address, dob, skills, interests, updated_at
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(&update.name)
            .bind(&update.contact_number)
            .bind(&update.address)
            .bind(update.dob)
            .bind(&update.skills)
            .bind(&update.interests)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(profile_from_row(&row)),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StoreError::NotFound(user_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let query = r#"
            SELECT user_id, name, contact_number, address, dob, skills, interests, updated_at
            FROM user_profiles
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
