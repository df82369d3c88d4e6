mod email_client;
mod sms_client;

pub use email_client::{ConsoleMailer, EmailClient};
pub use sms_client::{ConsoleSms, SmsClient};

use async_trait::async_trait;

use crate::utils::error::Result;

/// Outbound email transport. The core only calls this; delivery is external.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text: Option<&str>,
        html: Option<&str>,
    ) -> Result<()>;
}

/// Outbound SMS transport. `to_phone` is E.164.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to_phone: &str, body: &str) -> Result<()>;
}
