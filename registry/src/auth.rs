use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::SaltString;
use rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entity::app_user;

#[derive(Debug)]
pub enum AuthApiError {
    NotFound,
    InvalidPassword,
    Inactive,
    Db(sea_orm::DbErr),
    Hash(String),
}

impl std::fmt::Display for AuthApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthApiError::NotFound => write!(f, "User not found"),
            AuthApiError::InvalidPassword => write!(f, "Invalid password"),
            AuthApiError::Inactive => write!(f, "User is inactive"),
            AuthApiError::Db(e) => write!(f, "Database error: {e}"),
            AuthApiError::Hash(e) => write!(f, "Hash error: {e}"),
        }
    }
}

impl std::error::Error for AuthApiError {}

impl From<sea_orm::DbErr> for AuthApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        AuthApiError::Db(e)
    }
}

pub struct Auth {
    db: DatabaseConnection,
}

impl Auth {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Verify username/password and stamp `last_login_at`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<app_user::Model, AuthApiError> {
        let user = app_user::Entity::find()
            .filter(app_user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AuthApiError::NotFound)?;

        if !user.is_active {
            return Err(AuthApiError::Inactive);
        }

        let hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AuthApiError::Hash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AuthApiError::InvalidPassword)?;

        let mut active: app_user::ActiveModel = user.into();
        active.last_login_at = Set(Some(Utc::now().naive_utc()));
        let user = active.update(&self.db).await?;

        Ok(user)
    }

    /// Create a user in `org_id` with an Argon2-hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        org_id: &str,
    ) -> Result<app_user::Model, AuthApiError> {
        let password_hash = Self::hash_password(password)?;
        let now = Utc::now().naive_utc();
        let user = app_user::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            org_id: Set(org_id.to_owned()),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn count_users(&self) -> Result<u64, AuthApiError> {
        Ok(app_user::Entity::find().count(&self.db).await?)
    }

    /// Hash a plaintext password with Argon2id + a random salt.
    pub fn hash_password(password: &str) -> Result<String, AuthApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthApiError::Hash(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}
