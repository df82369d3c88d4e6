use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::{PublicUser, User};
use crate::utils::error::Result;
use crate::utils::token_service::TokenService;

/// The single exit shape of every authentication channel: password,
/// OTP, OAuth callback and email-link confirm all converge here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct SessionIssuer {
    tokens: Arc<TokenService>,
}

impl SessionIssuer {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub fn issue(&self, user: &User) -> Result<AuthSession> {
        Ok(AuthSession {
            token: self.tokens.issue(user.id)?,
            user: PublicUser::from(user),
        })
    }

    pub fn verify(&self, token: &str) -> Result<i64> {
        self.tokens.verify(token)
    }
}
