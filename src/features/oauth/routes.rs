use actix_web::{get, http::header, web, HttpResponse};

use super::service::OAuthService;
use super::types::{CallbackQuery, Provider};
use crate::utils::error::Error;

#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "auth",
    responses((status = 302, description = "Redirect to Google consent screen"))
)]
#[get("/auth/google")]
pub async fn google_start(oauth: web::Data<OAuthService>) -> Result<HttpResponse, Error> {
    let url = oauth.authorize_url(Provider::Google)?;
    Ok(redirect(url))
}

#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    responses((status = 302, description = "Redirect to frontend with token or error slug"))
)]
#[get("/auth/google/callback")]
pub async fn google_callback(
    query: web::Query<CallbackQuery>,
    oauth: web::Data<OAuthService>,
) -> HttpResponse {
    redirect(oauth.callback_redirect(Provider::Google, &query).await)
}

#[utoipa::path(
    get,
    path = "/auth/facebook",
    tag = "auth",
    responses((status = 302, description = "Redirect to Facebook consent screen"))
)]
#[get("/auth/facebook")]
pub async fn facebook_start(oauth: web::Data<OAuthService>) -> Result<HttpResponse, Error> {
    let url = oauth.authorize_url(Provider::Facebook)?;
    Ok(redirect(url))
}

#[utoipa::path(
    get,
    path = "/auth/facebook/callback",
    tag = "auth",
    responses((status = 302, description = "Redirect to frontend with token or error slug"))
)]
#[get("/auth/facebook/callback")]
pub async fn facebook_callback(
    query: web::Query<CallbackQuery>,
    oauth: web::Data<OAuthService>,
) -> HttpResponse {
    redirect(oauth.callback_redirect(Provider::Facebook, &query).await)
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}
