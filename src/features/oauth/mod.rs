pub mod provider;
pub mod resolver;
pub mod routes;
pub mod service;
pub mod types;

pub use provider::{FacebookOAuth, GoogleOAuth};
pub use service::OAuthService;
pub use types::{OAuthProfile, Provider};
