use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::config::traits::Env;

/// Provider credentials, read once at startup and handed to the OAuth
/// clients by value. No ambient/global strategy objects.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSettings {
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_callback_url: String,
    pub facebook_app_id: String,
    pub facebook_app_secret: String,
    pub facebook_callback_url: String,
}

impl Env for OAuthSettings {
    fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .add_source(Environment::default())
            .build()?;

        settings.try_deserialize()
    }
}
