use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, Rng};

use crate::features::auth::{AuthSession, SessionIssuer};
use crate::features::clients::SmsSender;
use crate::features::users::helpers::{is_valid_bd_phone, normalize_phone, phone_to_e164};
use crate::features::users::{AuthProvider, NewUser, UserStore};
use crate::utils::error::{Error, Result};

const OTP_TTL_MINUTES: i64 = 10;

#[derive(Clone)]
pub struct OtpService {
    users: Arc<dyn UserStore>,
    sms: Arc<dyn SmsSender>,
    sessions: SessionIssuer,
    dev_mode: bool,
}

#[derive(Debug)]
pub struct OtpDispatch {
    pub message: String,
    pub dev_otp: Option<String>,
}

impl OtpService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sms: Arc<dyn SmsSender>,
        sessions: SessionIssuer,
        dev_mode: bool,
    ) -> Self {
        Self {
            users,
            sms,
            sessions,
            dev_mode,
        }
    }

    /// Issue a fresh code for the phone, creating a placeholder account on
    /// first contact. Any previous code is overwritten: only the newest one
    /// is ever valid. The code is persisted before delivery is attempted so
    /// a failed send never orphans the user.
    pub async fn request(&self, phone: &str) -> Result<OtpDispatch> {
        let phone = normalize_phone(phone);
        if !is_valid_bd_phone(&phone) {
            return Err(Error::Validation(
                "please provide a valid BD mobile number (01XXXXXXXXX)".into(),
            ));
        }

        let code = generate_code();
        let expiry = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        match self.users.find_by_phone(&phone).await? {
            Some(mut user) => {
                user.otp = Some(code.clone());
                user.otp_expiry = Some(expiry);
                self.users.save(&user).await?;
            }
            None => {
                let created = self
                    .users
                    .create(new_phone_user(&phone, &code, expiry))
                    .await;
                match created {
                    Ok(_) => {}
                    // Concurrent request won the create; retry as a read.
                    Err(Error::Conflict(_)) => {
                        let mut user = self
                            .users
                            .find_by_phone(&phone)
                            .await?
                            .ok_or(Error::NotFound)?;
                        user.otp = Some(code.clone());
                        user.otp_expiry = Some(expiry);
                        self.users.save(&user).await?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let body = format!(
            "Your verification code is {code}. It is valid for {OTP_TTL_MINUTES} minutes."
        );
        match self.sms.send(&phone_to_e164(&phone), &body).await {
            Ok(()) => Ok(OtpDispatch {
                message: "OTP sent".into(),
                dev_otp: self.dev_mode.then(|| code),
            }),
            Err(e) if self.dev_mode => {
                tracing::warn!(error = %e, phone = %phone, "sms delivery failed, code stays valid");
                Ok(OtpDispatch {
                    message: "OTP generated (delivery failed, dev mode)".into(),
                    dev_otp: Some(code),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Compare against the stored code. Expiry is evaluated first and an
    /// expired code is cleared on the spot, so a later attempt with the
    /// same digits cannot succeed.
    pub async fn verify(&self, phone: &str, code: &str) -> Result<AuthSession> {
        let phone = normalize_phone(phone);
        let mut user = self
            .users
            .find_by_phone(&phone)
            .await?
            .ok_or(Error::NotFound)?;

        let (Some(stored), Some(expiry)) = (user.otp.clone(), user.otp_expiry) else {
            return Err(Error::CodeExpired);
        };

        if expiry < Utc::now() {
            user.otp = None;
            user.otp_expiry = None;
            self.users.save(&user).await?;
            return Err(Error::CodeExpired);
        }

        if stored != code {
            return Err(Error::CodeMismatch);
        }

        user.phone_verified = true;
        user.otp = None;
        user.otp_expiry = None;
        let user = self.users.save(&user).await?;

        self.sessions.issue(&user)
    }
}

fn new_phone_user(phone: &str, code: &str, expiry: chrono::DateTime<Utc>) -> NewUser {
    NewUser {
        name: format!("User_{}", &phone[phone.len() - 4..]),
        phone: Some(phone.to_string()),
        auth_provider: AuthProvider::Phone,
        otp: Some(code.to_string()),
        otp_expiry: Some(expiry),
        ..NewUser::default()
    }
}

/// Uniform over [100000, 999999].
fn generate_code() -> String {
    OsRng.gen_range(100_000..=999_999).to_string()
}
