pub mod extractor;
pub mod routes;
pub mod service;
pub mod session;
pub mod types;

pub use extractor::AuthedUser;
pub use service::AuthService;
pub use session::{AuthSession, SessionIssuer};
