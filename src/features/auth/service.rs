use std::sync::Arc;

use validator::ValidateEmail;

use super::session::{AuthSession, SessionIssuer};
use super::types::{LoginReq, RegisterReq, UpdateProfileReq};
use crate::features::users::helpers::{is_valid_bd_phone, normalize_email, normalize_phone};
use crate::features::users::{
    AuthProvider, NewUser, PublicUser, Role, User, UserStore, VerificationStatus,
};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::error::{Error, Result};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionIssuer) -> Self {
        Self { users, sessions }
    }

    pub async fn register(&self, req: RegisterReq) -> Result<AuthSession> {
        let (Some(name), Some(email), Some(password)) = (&req.name, &req.email, &req.password)
        else {
            return Err(Error::Validation(
                "please provide name, email and password".into(),
            ));
        };

        let name = name.trim();
        if name.len() < 2 || name.len() > 50 {
            return Err(Error::Validation(
                "name must be between 2 and 50 characters".into(),
            ));
        }

        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(Error::Validation("please provide a valid email".into()));
        }

        if password.len() < 8 {
            return Err(Error::Validation(
                "password must be at least 8 characters long".into(),
            ));
        }

        let phone = match &req.phone {
            Some(p) => {
                let p = normalize_phone(p);
                if !is_valid_bd_phone(&p) {
                    return Err(Error::Validation(
                        "please provide a valid BD mobile number (01XXXXXXXXX)".into(),
                    ));
                }
                Some(p)
            }
            None => None,
        };

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::Conflict("user with this email already exists".into()));
        }

        let role = req.role.unwrap_or(Role::Buyer);
        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email: Some(email),
                phone,
                password_hash: Some(hash_password(password)?),
                auth_provider: AuthProvider::Local,
                role,
                // Sellers enter the approval queue right away.
                verification_status: if role == Role::Seller {
                    VerificationStatus::Pending
                } else {
                    VerificationStatus::None
                },
                ..NewUser::default()
            })
            .await?;

        self.sessions.issue(&user)
    }

    /// Missing user and wrong password produce the same error so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn login(&self, req: LoginReq) -> Result<AuthSession> {
        let (Some(email), Some(password)) = (&req.email, &req.password) else {
            return Err(Error::Validation("please provide email and password".into()));
        };

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(Error::InvalidCredentials)?;

        let Some(stored_hash) = &user.password_hash else {
            return Err(Error::OAuthOnlyAccount);
        };

        if !verify_password(stored_hash, password)? {
            return Err(Error::InvalidCredentials);
        }

        self.sessions.issue(&user)
    }

    /// Bearer-token authentication for protected routes.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user_id = self.sessions.verify(token)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(Error::Unauthorized)
    }

    pub async fn update_profile(
        &self,
        mut user: User,
        req: UpdateProfileReq,
    ) -> Result<PublicUser> {
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.len() < 2 || name.len() > 50 {
                return Err(Error::Validation(
                    "name must be between 2 and 50 characters".into(),
                ));
            }
            user.name = name;
        }
        if let Some(phone) = req.phone {
            let phone = normalize_phone(&phone);
            if !is_valid_bd_phone(&phone) {
                return Err(Error::Validation(
                    "please provide a valid BD mobile number (01XXXXXXXXX)".into(),
                ));
            }
            user.phone = Some(phone);
        }
        if let Some(avatar) = req.avatar {
            user.avatar = Some(avatar);
        }

        let saved = self.users.save(&user).await?;
        Ok(PublicUser::from(&saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::testing::InMemoryUsers;
    use crate::utils::token_service::TokenService;

    fn service() -> (Arc<InMemoryUsers>, AuthService) {
        let users = Arc::new(InMemoryUsers::new());
        let sessions = SessionIssuer::new(Arc::new(TokenService::new("test-secret", 3600)));
        let svc = AuthService::new(users.clone(), sessions);
        (users, svc)
    }

    fn register_req(email: &str, password: &str) -> RegisterReq {
        RegisterReq {
            name: Some("Asha".into()),
            email: Some(email.into()),
            password: Some(password.into()),
            phone: None,
            role: None,
        }
    }

    fn login_req(email: &str, password: &str) -> LoginReq {
        LoginReq {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[actix_web::test]
    async fn register_then_login_yields_same_user_id() {
        let (_, svc) = service();
        let registered = svc.register(register_req("a@x.com", "Passw0rd1")).await.unwrap();
        assert!(!registered.token.is_empty());
        assert_eq!(registered.user.email.as_deref(), Some("a@x.com"));

        let logged_in = svc.login(login_req("a@x.com", "Passw0rd1")).await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[actix_web::test]
    async fn email_is_normalized_on_register_and_login() {
        let (_, svc) = service();
        let registered = svc
            .register(register_req("  Asha@X.Com ", "Passw0rd1"))
            .await
            .unwrap();
        assert_eq!(registered.user.email.as_deref(), Some("asha@x.com"));

        let logged_in = svc.login(login_req("ASHA@x.com", "Passw0rd1")).await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[actix_web::test]
    async fn duplicate_email_registration_conflicts() {
        let (users, svc) = service();
        svc.register(register_req("a@x.com", "Passw0rd1")).await.unwrap();
        let err = svc.register(register_req("a@x.com", "0therPass!")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(users.count(), 1);
    }

    #[actix_web::test]
    async fn short_password_is_rejected() {
        let (users, svc) = service();
        let err = svc.register(register_req("a@x.com", "short")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(users.count(), 0);
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected() {
        let (_, svc) = service();
        let err = svc
            .register(RegisterReq {
                name: Some("Asha".into()),
                email: None,
                password: Some("Passw0rd1".into()),
                phone: None,
                role: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[actix_web::test]
    async fn unknown_user_and_wrong_password_fail_identically() {
        let (_, svc) = service();
        svc.register(register_req("a@x.com", "Passw0rd1")).await.unwrap();

        let missing = svc.login(login_req("nobody@x.com", "Passw0rd1")).await.unwrap_err();
        let wrong = svc.login(login_req("a@x.com", "WrongPass1")).await.unwrap_err();
        assert_eq!(missing.to_string(), wrong.to_string());
        assert!(matches!(missing, Error::InvalidCredentials));
        assert!(matches!(wrong, Error::InvalidCredentials));
    }

    #[actix_web::test]
    async fn passwordless_account_cannot_password_login() {
        let (users, svc) = service();
        users
            .create(NewUser {
                name: "OAuth Only".into(),
                email: Some("g@x.com".into()),
                google_id: Some("google-123".into()),
                auth_provider: AuthProvider::Google,
                ..NewUser::default()
            })
            .await
            .unwrap();

        let err = svc.login(login_req("g@x.com", "whatever123")).await.unwrap_err();
        assert!(matches!(err, Error::OAuthOnlyAccount));
    }

    #[actix_web::test]
    async fn seller_registration_enters_pending_approval() {
        let (_, svc) = service();
        let session = svc
            .register(RegisterReq {
                name: Some("Shop".into()),
                email: Some("s@x.com".into()),
                password: Some("Passw0rd1".into()),
                phone: Some("01712345678".into()),
                role: Some(Role::Seller),
            })
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Seller);
        assert_eq!(session.user.verification_status, VerificationStatus::Pending);
    }

    #[actix_web::test]
    async fn authenticate_resolves_token_back_to_user() {
        let (_, svc) = service();
        let session = svc.register(register_req("a@x.com", "Passw0rd1")).await.unwrap();
        let user = svc.authenticate(&session.token).await.unwrap();
        assert_eq!(user.id, session.user.id);

        assert!(matches!(
            svc.authenticate("garbage").await,
            Err(Error::Unauthorized)
        ));
    }
}
