use std::sync::Arc;

use chrono::{Duration, Utc};
use validator::ValidateEmail;

use crate::features::auth::{AuthSession, SessionIssuer};
use crate::features::clients::Mailer;
use crate::features::users::helpers::normalize_email;
use crate::features::users::{AuthProvider, NewUser, User, UserStore};
use crate::utils::crypto::{random_token_hex, sha256_hex};
use crate::utils::error::{Error, Result};

const LINK_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct EmailVerificationService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    sessions: SessionIssuer,
    frontend_url: String,
    dev_mode: bool,
}

#[derive(Debug)]
pub struct VerificationDispatch {
    pub message: String,
    pub dev_verification_url: Option<String>,
}

impl EmailVerificationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        sessions: SessionIssuer,
        frontend_url: impl Into<String>,
        dev_mode: bool,
    ) -> Self {
        Self {
            users,
            mailer,
            sessions,
            frontend_url: frontend_url.into(),
            dev_mode,
        }
    }

    /// Mint a fresh link token for the address. Only the sha256 of the raw
    /// token is stored; the raw value exists in the outgoing mail alone, so
    /// a database read cannot forge a valid link. The hash is persisted
    /// before delivery is attempted.
    pub async fn request(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<VerificationDispatch> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(Error::Validation("please provide a valid email".into()));
        }

        let existing = self.users.find_by_email(&email).await?;
        if existing.as_ref().is_some_and(|u| u.email_verified) {
            return Err(Error::AlreadyVerified);
        }

        let raw_token = random_token_hex();
        let token_hash = sha256_hex(&raw_token);
        let expiry = Utc::now() + Duration::hours(LINK_TTL_HOURS);

        let user = match existing {
            Some(mut user) => {
                user.email_verification_token_hash = Some(token_hash);
                user.email_verification_expiry = Some(expiry);
                self.users.save(&user).await?
            }
            None => {
                let created = self
                    .users
                    .create(NewUser {
                        name: name
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("User_{}", Utc::now().timestamp_millis())),
                        email: Some(email.clone()),
                        auth_provider: AuthProvider::Local,
                        email_verification_token_hash: Some(token_hash.clone()),
                        email_verification_expiry: Some(expiry),
                        ..NewUser::default()
                    })
                    .await;
                match created {
                    Ok(user) => user,
                    // Concurrent request won the create; retry as a read.
                    Err(Error::Conflict(_)) => {
                        let mut user = self
                            .users
                            .find_by_email(&email)
                            .await?
                            .ok_or(Error::NotFound)?;
                        if user.email_verified {
                            return Err(Error::AlreadyVerified);
                        }
                        user.email_verification_token_hash = Some(token_hash);
                        user.email_verification_expiry = Some(expiry);
                        self.users.save(&user).await?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let url = format!(
            "{}/verify-email/{}",
            self.frontend_url.trim_end_matches('/'),
            raw_token
        );

        let (subject, text, html) = verification_email(&user.name, &url);
        match self.mailer.send(&email, &subject, Some(&text), Some(&html)).await {
            Ok(()) => Ok(VerificationDispatch {
                message: "verification email sent".into(),
                dev_verification_url: self.dev_mode.then(|| url),
            }),
            Err(e) if self.dev_mode => {
                tracing::warn!(error = %e, email = %email, "verification mail failed, link stays valid");
                Ok(VerificationDispatch {
                    message: "verification link generated (delivery failed, dev mode)".into(),
                    dev_verification_url: Some(url),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Single-use confirm: the hash/expiry pair is cleared on success, so
    /// presenting the same raw token again finds no match.
    pub async fn confirm(&self, raw_token: &str) -> Result<AuthSession> {
        let token_hash = sha256_hex(raw_token);

        let mut user = self
            .users
            .find_by_verification_hash(&token_hash, Utc::now())
            .await?
            .ok_or(Error::InvalidOrExpired)?;

        user.email_verified = true;
        user.email_verification_token_hash = None;
        user.email_verification_expiry = None;
        let user = self.users.save(&user).await?;

        self.send_welcome(&user).await;

        self.sessions.issue(&user)
    }

    /// Best effort: a failed welcome mail never fails the confirm.
    async fn send_welcome(&self, user: &User) {
        let Some(email) = &user.email else { return };
        let (subject, text, html) = welcome_email(&user.name, &self.frontend_url);
        if let Err(e) = self.mailer.send(email, &subject, Some(&text), Some(&html)).await {
            tracing::warn!(error = %e, email = %email, "welcome mail failed");
        }
    }
}

fn verification_email(name: &str, url: &str) -> (String, String, String) {
    let subject = "Verify your email".to_string();
    let text = format!(
        "Hi {name},\n\nPlease verify your email address by opening this link:\n{url}\n\n\
         The link expires in {LINK_TTL_HOURS} hours. If you did not create this account, \
         you can ignore this email."
    );
    let html = format!(
        r#"
<!doctype html>
<html>
  <body style="background:#f6f8fb;margin:0;padding:24px;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;color:#0f172a;">
    <h2>Hi {name}!</h2>
    <p>Please verify your email address to activate your account.</p>
    <div style="text-align:center;margin:20px 0;">
      <a href="{url}" style="display:inline-block;font-weight:700;color:#ffffff;background:#16a085;border-radius:12px;padding:12px 18px;text-decoration:none;">
        Verify Email Address
      </a>
    </div>
    <p>Or copy and paste this link in your browser:</p>
    <p style="word-break:break-all;color:#16a085;">{url}</p>
    <p>This link expires in {LINK_TTL_HOURS} hours. If you did not create this account, ignore this email.</p>
  </body>
</html>
"#
    );
    (subject, text, html)
}

fn welcome_email(name: &str, frontend_url: &str) -> (String, String, String) {
    let subject = "Welcome aboard!".to_string();
    let text = format!(
        "Hi {name},\n\nYour email has been verified. You can now post ads, contact sellers \
         and manage your listings.\n\n{frontend_url}"
    );
    let html = format!(
        r#"
<!doctype html>
<html>
  <body style="background:#f6f8fb;margin:0;padding:24px;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;color:#0f172a;">
    <h2>Hi {name}!</h2>
    <p>Your email has been verified. You can now post ads, contact sellers and manage your listings.</p>
    <div style="text-align:center;margin:20px 0;">
      <a href="{frontend_url}" style="display:inline-block;font-weight:700;color:#ffffff;background:#16a085;border-radius:12px;padding:12px 18px;text-decoration:none;">
        Start Exploring
      </a>
    </div>
  </body>
</html>
"#
    );
    (subject, text, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::testing::{InMemoryUsers, RecordingMailer};
    use crate::utils::token_service::TokenService;

    const EMAIL: &str = "a@x.com";
    const FRONTEND: &str = "http://localhost:3000";

    fn service(
        mailer: Arc<RecordingMailer>,
        dev_mode: bool,
    ) -> (Arc<InMemoryUsers>, EmailVerificationService) {
        let users = Arc::new(InMemoryUsers::new());
        let sessions = SessionIssuer::new(Arc::new(TokenService::new("test-secret", 3600)));
        let svc = EmailVerificationService::new(
            users.clone(),
            mailer,
            sessions,
            FRONTEND,
            dev_mode,
        );
        (users, svc)
    }

    fn raw_token_from_url(url: &str) -> String {
        url.rsplit('/').next().unwrap().to_string()
    }

    #[actix_web::test]
    async fn request_stores_only_the_hash() {
        let mailer = Arc::new(RecordingMailer::new());
        let (users, svc) = service(mailer.clone(), true);

        let dispatch = svc.request(EMAIL, Some("Asha")).await.unwrap();
        let url = dispatch.dev_verification_url.unwrap();
        let raw = raw_token_from_url(&url);

        let user = users.find_by_email(EMAIL).await.unwrap().unwrap();
        let stored = user.email_verification_token_hash.unwrap();
        assert_ne!(stored, raw);
        assert_eq!(stored, sha256_hex(&raw));
        assert!(user.email_verification_expiry.unwrap() > Utc::now());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, EMAIL);
        assert!(sent[0].html.as_ref().unwrap().contains(&url));
    }

    #[actix_web::test]
    async fn confirm_succeeds_exactly_once() {
        let mailer = Arc::new(RecordingMailer::new());
        let (users, svc) = service(mailer.clone(), true);

        let url = svc
            .request(EMAIL, Some("Asha"))
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();
        let raw = raw_token_from_url(&url);

        let session = svc.confirm(&raw).await.unwrap();
        assert!(session.user.email_verified);
        assert!(!session.token.is_empty());

        let user = users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(user.email_verification_token_hash.is_none());
        assert!(user.email_verification_expiry.is_none());

        let err = svc.confirm(&raw).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOrExpired));
    }

    #[actix_web::test]
    async fn expired_link_is_rejected() {
        let mailer = Arc::new(RecordingMailer::new());
        let (users, svc) = service(mailer, true);

        let url = svc
            .request(EMAIL, None)
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();
        let raw = raw_token_from_url(&url);

        let id = users.find_by_email(EMAIL).await.unwrap().unwrap().id;
        users.modify(id, |u| {
            u.email_verification_expiry = Some(Utc::now() - Duration::hours(1));
        });

        let err = svc.confirm(&raw).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOrExpired));
    }

    #[actix_web::test]
    async fn already_verified_address_is_rejected() {
        let mailer = Arc::new(RecordingMailer::new());
        let (users, svc) = service(mailer, true);

        let url = svc
            .request(EMAIL, Some("Asha"))
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();
        svc.confirm(&raw_token_from_url(&url)).await.unwrap();

        let err = svc.request(EMAIL, None).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyVerified));
        assert_eq!(users.count(), 1);
    }

    #[actix_web::test]
    async fn re_request_invalidates_the_previous_link() {
        let mailer = Arc::new(RecordingMailer::new());
        let (_, svc) = service(mailer, true);

        let first = svc
            .request(EMAIL, Some("Asha"))
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();
        let second = svc
            .request(EMAIL, Some("Asha"))
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();

        let err = svc.confirm(&raw_token_from_url(&first)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOrExpired));
        let session = svc.confirm(&raw_token_from_url(&second)).await.unwrap();
        assert!(session.user.email_verified);
    }

    #[actix_web::test]
    async fn welcome_mail_failure_does_not_fail_confirm() {
        let mailer = Arc::new(RecordingMailer::new());
        let (_, svc) = service(mailer.clone(), true);

        let url = svc
            .request(EMAIL, Some("Asha"))
            .await
            .unwrap()
            .dev_verification_url
            .unwrap();

        // Verification mail went out; the welcome mail will not.
        mailer.fail.store(true, std::sync::atomic::Ordering::SeqCst);

        let session = svc.confirm(&raw_token_from_url(&url)).await.unwrap();
        assert!(session.user.email_verified);
    }

    #[actix_web::test]
    async fn delivery_failure_degrades_in_dev_and_surfaces_in_production() {
        let (_, dev_svc) = service(Arc::new(RecordingMailer::failing()), true);
        let dispatch = dev_svc.request(EMAIL, None).await.unwrap();
        assert!(dispatch.dev_verification_url.is_some());

        let (users, prod_svc) = service(Arc::new(RecordingMailer::failing()), false);
        let err = prod_svc.request(EMAIL, None).await.unwrap_err();
        assert!(matches!(err, Error::Notifier(_)));
        // Hash persisted before the send, so a retry can reuse it.
        let user = users.find_by_email(EMAIL).await.unwrap().unwrap();
        assert!(user.email_verification_token_hash.is_some());
    }

    #[actix_web::test]
    async fn malformed_email_is_rejected() {
        let (_, svc) = service(Arc::new(RecordingMailer::new()), true);
        let err = svc.request("not-an-email", None).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
