//! Auth application service: register, login (password hash/verify).

use crate::auth::JwtSecret;
use crate::db::{user_create, user_find_by_email, user_get_by_id, DbPool, UserRow};
use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, info};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthAppService {
    db: DbPool,
    jwt: JwtSecret,
}

impl AuthAppService {
    pub fn new(db: DbPool, jwt: JwtSecret) -> Self {
        Self { db, jwt }
    }

    /// Create the user and issue a token. Email is stored normalized.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(UserRow, String)> {
        let email = Self::normalize_email(email);
        if user_find_by_email(&self.db, &email).await?.is_some() {
            debug!(email = %email, "registration rejected: email taken");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = Self::hash_password(password)?;
        let user = user_create(&self.db, name, &email, &password_hash).await?;
        let token = self.jwt.issue(user.id)?;
        info!(user_id = %user.id, "user registered");
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<(UserRow, String)> {
        let email = Self::normalize_email(email);
        let user = user_find_by_email(&self.db, &email)
            .await?
            .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

        if !Self::verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "login rejected: bad password");
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.jwt.issue(user.id)?;
        Ok((user, token))
    }

    pub async fn current_user(&self, id: Uuid) -> AppResult<UserRow> {
        user_get_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::Auth("User not found".to_string()))
    }

    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}
