use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::db::{Role, User, VerificationStatus};

/// The one projection of a user that is safe to return to clients.
/// Password hash, OTP and verification-token hash never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_verified: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub verification_status: VerificationStatus,
    pub rating: f64,
    pub review_count: i32,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            is_verified: user.is_verified,
            email_verified: user.email_verified,
            phone_verified: user.phone_verified,
            verification_status: user.verification_status,
            rating: user.rating,
            review_count: user.review_count,
            avatar: user.avatar.clone(),
            created_at: user.created_at,
        }
    }
}
