pub mod auth;
pub mod clients;
pub mod email_verification;
pub mod oauth;
pub mod otp;
pub mod system;
pub mod users;
