use std::sync::Arc;
use thiserror::Error;

use crate::models::{NewUser, ProfileUpdate, User, UserProfile};
use crate::services::password::{hash_password, verify_password, PasswordError};
use crate::services::users::{StoreError, UserStore};

/// Errors from account operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Signup, login and profile operations over a [`UserStore`]
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, AccountError> {
        let new_user = NewUser {
            name: name.trim().to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).await?,
        };

        match self.store.create_user(new_user).await {
            Ok(user) => {
                tracing::info!("Registered user {}", user.id);
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => Err(AccountError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials. Unknown email and wrong password look the same to callers.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            return Err(AccountError::InvalidCredentials);
        }

        tracing::debug!("User {} logged in", user.id);
        Ok(user)
    }

    pub async fn update_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let user = self.login(email, current_password).await?;

        let new_hash = hash_password(new_password).await?;
        if !self.store.update_password(&user.email, &new_hash).await? {
            return Err(AccountError::UserNotFound);
        }

        tracing::info!("Password updated for user {}", user.id);
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AccountError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn save_profile(&self, email: &str, update: ProfileUpdate) -> Result<UserProfile, AccountError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        match self.store.save_profile(user.id, update).await {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound(_)) => Err(AccountError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
