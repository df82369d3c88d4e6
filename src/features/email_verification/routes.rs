use actix_web::{get, post, web, HttpResponse};

use super::service::EmailVerificationService;
use super::types::{SendEmailVerificationReq, VerificationSentResponse};
use crate::utils::error::Error;

#[utoipa::path(
    post,
    path = "/auth/send-email-verification",
    tag = "auth",
    request_body = SendEmailVerificationReq,
    responses(
        (status = 200, description = "Verification link dispatched", body = VerificationSentResponse),
        (status = 400, description = "Malformed email or already verified"),
        (status = 500, description = "Mail delivery failed (production)"),
    )
)]
#[post("/auth/send-email-verification")]
pub async fn send_email_verification(
    payload: web::Json<SendEmailVerificationReq>,
    verification: web::Data<EmailVerificationService>,
) -> Result<HttpResponse, Error> {
    let email = payload
        .email
        .as_deref()
        .ok_or_else(|| Error::Validation("please provide an email".into()))?;
    let dispatch = verification.request(email, payload.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(VerificationSentResponse {
        message: dispatch.message,
        dev_verification_url: dispatch.dev_verification_url,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/verify-email/{token}",
    tag = "auth",
    params(("token" = String, Path, description = "Raw verification token from the emailed link")),
    responses(
        (status = 200, description = "Email verified, session issued", body = crate::features::auth::AuthSession),
        (status = 400, description = "Invalid or expired verification token"),
    )
)]
#[get("/auth/verify-email/{token}")]
pub async fn verify_email(
    token: web::Path<String>,
    verification: web::Data<EmailVerificationService>,
) -> Result<HttpResponse, Error> {
    let session = verification.confirm(&token).await?;
    Ok(HttpResponse::Ok().json(session))
}
