use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Channel that created the record. Later logins through other channels
/// link onto the same row without rewriting this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
    Facebook,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

/// Seller-approval trust gate. Independent of email/phone verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
    None,
}

/// The single persistent identity record. Every identity key is optional,
/// unique only among non-null values; at least one is populated on create.
/// Secret columns stay out of every serialized view: the only shape that
/// crosses the HTTP boundary is [`super::types::PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: Role,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    pub otp: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub email_verification_token_hash: Option<String>,
    pub email_verification_expiry: Option<DateTime<Utc>>,
    pub rating: f64,
    pub review_count: i32,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. Identity keys already normalized by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: Role,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub verification_status: VerificationStatus,
    pub otp: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub email_verification_token_hash: Option<String>,
    pub email_verification_expiry: Option<DateTime<Utc>>,
    pub avatar: Option<String>,
}

impl Default for NewUser {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: None,
            phone: None,
            password_hash: None,
            google_id: None,
            facebook_id: None,
            auth_provider: AuthProvider::Local,
            role: Role::Buyer,
            email_verified: false,
            phone_verified: false,
            verification_status: VerificationStatus::None,
            otp: None,
            otp_expiry: None,
            email_verification_token_hash: None,
            email_verification_expiry: None,
            avatar: None,
        }
    }
}
