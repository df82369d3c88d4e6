use std::sync::Arc;

use super::provider::{FacebookOAuth, GoogleOAuth};
use super::resolver::resolve_oauth_profile;
use super::types::{CallbackQuery, Provider};
use crate::features::auth::{AuthSession, SessionIssuer};
use crate::features::users::UserStore;
use crate::utils::error::{Error, Result};

#[derive(Clone)]
pub struct OAuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionIssuer,
    google: GoogleOAuth,
    facebook: FacebookOAuth,
    frontend_url: String,
}

impl OAuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionIssuer,
        google: GoogleOAuth,
        facebook: FacebookOAuth,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            sessions,
            google,
            facebook,
            frontend_url: frontend_url.into(),
        }
    }

    pub fn authorize_url(&self, provider: Provider) -> Result<String> {
        match provider {
            Provider::Google => self.google.authorize_url(),
            Provider::Facebook => self.facebook.authorize_url(),
        }
    }

    /// The callback always ends in a frontend redirect: token on success,
    /// an error slug otherwise. Failures never leak provider details.
    pub async fn callback_redirect(&self, provider: Provider, query: &CallbackQuery) -> String {
        let frontend = self.frontend_url.trim_end_matches('/');
        match self.complete(provider, query).await {
            Ok(session) => format!("{frontend}/auth/success?token={}", session.token),
            Err(e) => {
                tracing::error!(error = %e, provider = provider.error_slug(), "oauth callback failed");
                format!("{frontend}/auth/success?error={}", provider.error_slug())
            }
        }
    }

    async fn complete(&self, provider: Provider, query: &CallbackQuery) -> Result<AuthSession> {
        if let Some(denied) = &query.error {
            return Err(Error::Validation(format!("provider returned error: {denied}")));
        }
        let code = query
            .code
            .as_deref()
            .ok_or_else(|| Error::Validation("missing authorization code".into()))?;

        let profile = match provider {
            Provider::Google => self.google.fetch_profile(code).await?,
            Provider::Facebook => self.facebook.fetch_profile(code).await?,
        };

        let user = resolve_oauth_profile(self.users.as_ref(), &profile).await?;
        self.sessions.issue(&user)
    }
}
