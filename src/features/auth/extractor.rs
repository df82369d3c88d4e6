use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use super::service::AuthService;
use crate::features::users::User;
use crate::utils::error::Error;

/// Bearer-token guard for protected routes. Verification is stateless;
/// the store is hit once to load the current record.
pub struct AuthedUser(pub User);

impl FromRequest for AuthedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth = req.app_data::<web::Data<AuthService>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let auth =
                auth.ok_or_else(|| Error::Unexpected("auth service not configured".into()))?;
            let header = header.ok_or(Error::Unauthorized)?;
            let token = header.strip_prefix("Bearer ").ok_or(Error::Unauthorized)?;
            let user = auth.authenticate(token).await?;
            Ok(AuthedUser(user))
        })
    }
}
