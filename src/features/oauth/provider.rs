use reqwest::Url;
use serde::Deserialize;

use super::types::{OAuthProfile, Provider};
use crate::config::OAuthSettings;
use crate::utils::error::{Error, Result};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/me";

/// Per-provider credentials, built once at startup and passed by value.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    cfg: ProviderConfig,
}

impl GoogleOAuth {
    pub fn new(settings: &OAuthSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg: ProviderConfig {
                client_id: settings.google_client_id.clone(),
                client_secret: settings.google_client_secret.clone(),
                callback_url: settings.google_callback_url.clone(),
            },
        }
    }

    pub fn authorize_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.cfg.client_id.as_str()),
                ("redirect_uri", self.cfg.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
            ],
        )
        .map_err(|e| Error::Unexpected(format!("build google authorize url: {e}")))?;
        Ok(url.into())
    }

    /// Code exchange + userinfo fetch within the one callback request;
    /// no server-side session carries state between the two.
    pub async fn fetch_profile(&self, code: &str) -> Result<OAuthProfile> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("redirect_uri", self.cfg.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Unexpected(format!("google token exchange failed: {e}")))?
            .json()
            .await?;

        #[derive(Deserialize)]
        struct GoogleUserInfo {
            sub: String,
            name: Option<String>,
            email: Option<String>,
            picture: Option<String>,
        }

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Unexpected(format!("google userinfo fetch failed: {e}")))?
            .json()
            .await?;

        Ok(OAuthProfile {
            provider: Provider::Google,
            provider_id: info.sub,
            name: info.name.unwrap_or_else(|| "Google User".into()),
            email: info.email,
            avatar: info.picture,
        })
    }
}

#[derive(Clone)]
pub struct FacebookOAuth {
    http: reqwest::Client,
    cfg: ProviderConfig,
}

impl FacebookOAuth {
    pub fn new(settings: &OAuthSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg: ProviderConfig {
                client_id: settings.facebook_app_id.clone(),
                client_secret: settings.facebook_app_secret.clone(),
                callback_url: settings.facebook_callback_url.clone(),
            },
        }
    }

    pub fn authorize_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            FACEBOOK_AUTH_URL,
            &[
                ("client_id", self.cfg.client_id.as_str()),
                ("redirect_uri", self.cfg.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", "email,public_profile"),
            ],
        )
        .map_err(|e| Error::Unexpected(format!("build facebook authorize url: {e}")))?;
        Ok(url.into())
    }

    pub async fn fetch_profile(&self, code: &str) -> Result<OAuthProfile> {
        let token: TokenResponse = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("code", code),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("redirect_uri", self.cfg.callback_url.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Unexpected(format!("facebook token exchange failed: {e}")))?
            .json()
            .await?;

        #[derive(Deserialize)]
        struct FbPictureData {
            url: Option<String>,
        }
        #[derive(Deserialize)]
        struct FbPicture {
            data: Option<FbPictureData>,
        }
        #[derive(Deserialize)]
        struct FbUser {
            id: String,
            name: Option<String>,
            email: Option<String>,
            picture: Option<FbPicture>,
        }

        let info: FbUser = self
            .http
            .get(FACEBOOK_PROFILE_URL)
            .query(&[
                ("fields", "id,name,email,picture.type(large)"),
                ("access_token", token.access_token.as_str()),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Unexpected(format!("facebook profile fetch failed: {e}")))?
            .json()
            .await?;

        Ok(OAuthProfile {
            provider: Provider::Facebook,
            provider_id: info.id,
            name: info.name.unwrap_or_else(|| "Facebook User".into()),
            email: info.email,
            avatar: info.picture.and_then(|p| p.data).and_then(|d| d.url),
        })
    }
}
