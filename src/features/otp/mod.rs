pub mod routes;
pub mod service;
pub mod types;

pub use service::OtpService;
