use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub fn error_slug(&self) -> &'static str {
        match self {
            Provider::Google => "google_auth_failed",
            Provider::Facebook => "facebook_auth_failed",
        }
    }
}

/// Normalized profile returned by a provider after code exchange.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: Provider,
    pub provider_id: String,
    pub email: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
}

/// One proof of identity, matched in strict precedence order by the
/// resolver instead of ad hoc per-field conditionals.
#[derive(Debug, Clone, Copy)]
pub enum IdentityClaim<'a> {
    ProviderId(Provider, &'a str),
    Email(&'a str),
    Phone(&'a str),
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}
