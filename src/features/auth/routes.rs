use actix_web::{get, post, put, web, HttpResponse};

use super::extractor::AuthedUser;
use super::service::AuthService;
use super::types::{LoginReq, MeResponse, MessageResponse, RegisterReq, UpdateProfileReq};
use crate::features::users::PublicUser;
use crate::utils::error::Error;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created, session issued", body = super::session::AuthSession),
        (status = 400, description = "Missing fields or weak password"),
        (status = 409, description = "Email already registered"),
    )
)]
#[post("/auth/register")]
pub async fn register(
    payload: web::Json<RegisterReq>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, Error> {
    let session = auth.register(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(session))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session issued", body = super::session::AuthSession),
        (status = 401, description = "Invalid credentials or OAuth-only account"),
    )
)]
#[post("/auth/login")]
pub async fn login(
    payload: web::Json<LoginReq>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, Error> {
    let session = auth.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
#[get("/auth/me")]
pub async fn me(user: AuthedUser) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(MeResponse {
        user: PublicUser::from(&user.0),
    }))
}

#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_token" = [])),
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Profile updated", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 409, description = "Phone already in use"),
    )
)]
#[put("/auth/profile")]
pub async fn update_profile(
    user: AuthedUser,
    payload: web::Json<UpdateProfileReq>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, Error> {
    let updated = auth.update_profile(user.0, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MeResponse { user: updated }))
}

/// Tokens are stateless; logout exists so clients have a uniform endpoint
/// to end a session. The token simply ages out.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
#[post("/auth/logout")]
pub async fn logout(_user: AuthedUser) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "logged out".into(),
    }))
}
