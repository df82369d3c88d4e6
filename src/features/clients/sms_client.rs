use async_trait::async_trait;

use super::SmsSender;
use crate::utils::error::{Error, Result};

/// Twilio Messages API client.
#[derive(Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_phone: String,
}

impl SmsClient {
    /// Twilio account SIDs always start with `AC`; anything else means the
    /// environment is not actually wired for SMS.
    pub fn from_env() -> Result<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .ok()
            .filter(|sid| sid.starts_with("AC"))
            .ok_or_else(|| missing_env("TWILIO_ACCOUNT_SID"))?;
        let auth_token =
            std::env::var("TWILIO_AUTH_TOKEN").map_err(|_| missing_env("TWILIO_AUTH_TOKEN"))?;
        let from_phone =
            std::env::var("TWILIO_FROM_PHONE").map_err(|_| missing_env("TWILIO_FROM_PHONE"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_phone,
        })
    }
}

#[async_trait]
impl SmsSender for SmsClient {
    async fn send(&self, to_phone: &str, body: &str) -> Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );

        let res = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to_phone),
                ("From", self.from_phone.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| Error::Notifier(format!("twilio request failed: {e}")))?;

        if res.status().is_success() {
            tracing::info!(to = to_phone, "sms sent");
            Ok(())
        } else {
            let code = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            Err(Error::Notifier(format!(
                "twilio failed: status={code} body={text}"
            )))
        }
    }
}

fn missing_env(var: &'static str) -> Error {
    Error::Validation(format!("missing env var: {var}"))
}

/// Log-only fallback when Twilio credentials are absent (development).
#[derive(Clone, Default)]
pub struct ConsoleSms;

#[async_trait]
impl SmsSender for ConsoleSms {
    async fn send(&self, to_phone: &str, body: &str) -> Result<()> {
        tracing::info!(to = to_phone, body = body, "sms (console transport)");
        Ok(())
    }
}
