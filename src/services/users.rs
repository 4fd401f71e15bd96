use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewUser, ProfileUpdate, User, UserProfile};

/// Errors that can occur when reading or writing user records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Record store for accounts and profiles, keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns false when no user has this email
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError>;

    /// All users, oldest first
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Upsert. Omitted optional fields keep their stored value.
    async fn save_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, StoreError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Default)]
struct MemoryTables {
    users: Vec<User>,
    profiles: HashMap<Uuid, UserProfile>,
}

/// Process-local store, used when no database is configured and in tests
#[derive(Default)]
pub struct InMemoryUserStore {
    tables: RwLock<MemoryTables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let email = normalize_email(&user.email);
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(email));
        }

        let now = chrono::Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let email = normalize_email(email);
        let mut tables = self.tables.write().await;

        match tables.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn save_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<UserProfile, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::NotFound(user_id.to_string()));
        }

        let now = chrono::Utc::now();
        let profile = tables.profiles.entry(user_id).or_insert_with(|| UserProfile {
            user_id,
            name: None,
            contact_number: None,
            address: None,
            dob: None,
            skills: Vec::new(),
            interests: Vec::new(),
            updated_at: now,
        });

        if update.name.is_some() {
            profile.name = update.name;
        }
        if update.contact_number.is_some() {
            profile.contact_number = update.contact_number;
        }
        if update.address.is_some() {
            profile.address = update.address;
        }
        if update.dob.is_some() {
            profile.dob = update.dob;
        }
        profile.skills = update.skills;
        profile.interests = update.interests;
        profile.updated_at = now;

        Ok(profile.clone())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
