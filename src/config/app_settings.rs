use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::config::traits::Env;

/// Core identity settings: signing secret, token TTL, redirect targets and
/// the environment flag that unlocks dev-only response fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_seconds")]
    pub jwt_ttl_seconds: i64,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_jwt_ttl_seconds() -> i64 {
    24 * 60 * 60
}

fn default_frontend_url() -> String {
    "http://localhost:3000".into()
}

fn default_environment() -> String {
    "development".into()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".into()
}

impl AppSettings {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Env for AppSettings {
    fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .add_source(Environment::default())
            .build()?;

        settings.try_deserialize()
    }
}
