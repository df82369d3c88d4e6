use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::db::{NewUser, User};
use crate::utils::error::{Error, Result};

/// Credential store contract. All lookups are exact-match on the
/// normalized key; `create` surfaces unique-key collisions as `Conflict`
/// so callers can retry as a read-then-link.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>>;
    async fn find_by_facebook_id(&self, facebook_id: &str) -> Result<Option<User>>;
    /// Matches the stored token hash and requires the expiry to still be in
    /// the future; a stale hash is treated as absent.
    async fn find_by_verification_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>>;
    async fn create(&self, new: NewUser) -> Result<User>;
    async fn save(&self, user: &User) -> Result<User>;
}

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, google_id, facebook_id, \
     auth_provider, role, email_verified, phone_verified, is_verified, verification_status, \
     otp, otp_expiry, email_verification_token_hash, email_verification_expiry, \
     rating, review_count, avatar, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(&self, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            Error::Conflict(format!("{what} already exists"))
        }
        _ => Error::from(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_by_key("email", email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.find_by_key("phone", phone).await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        self.find_by_key("google_id", google_id).await
    }

    async fn find_by_facebook_id(&self, facebook_id: &str) -> Result<Option<User>> {
        self.find_by_key("facebook_id", facebook_id).await
    }

    async fn find_by_verification_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE email_verification_token_hash = $1 AND email_verification_expiry > $2"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users \
             (name, email, phone, password_hash, google_id, facebook_id, auth_provider, role, \
              email_verified, phone_verified, verification_status, otp, otp_expiry, \
              email_verification_token_hash, email_verification_expiry, avatar) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.password_hash)
            .bind(&new.google_id)
            .bind(&new.facebook_id)
            .bind(new.auth_provider)
            .bind(new.role)
            .bind(new.email_verified)
            .bind(new.phone_verified)
            .bind(new.verification_status)
            .bind(&new.otp)
            .bind(new.otp_expiry)
            .bind(&new.email_verification_token_hash)
            .bind(new.email_verification_expiry)
            .bind(&new.avatar)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "user with this identity key"))?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<User> {
        let sql = format!(
            "UPDATE users SET \
             name = $2, email = $3, phone = $4, password_hash = $5, google_id = $6, \
             facebook_id = $7, auth_provider = $8, role = $9, email_verified = $10, \
             phone_verified = $11, is_verified = $12, verification_status = $13, otp = $14, \
             otp_expiry = $15, email_verification_token_hash = $16, \
             email_verification_expiry = $17, avatar = $18, updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(&user.google_id)
            .bind(&user.facebook_id)
            .bind(user.auth_provider)
            .bind(user.role)
            .bind(user.email_verified)
            .bind(user.phone_verified)
            .bind(user.is_verified)
            .bind(user.verification_status)
            .bind(&user.otp)
            .bind(user.otp_expiry)
            .bind(&user.email_verification_token_hash)
            .bind(user.email_verification_expiry)
            .bind(&user.avatar)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "user with this identity key"))?;
        Ok(saved)
    }
}
