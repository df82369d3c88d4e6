use actix_web::{post, web, HttpResponse};

use super::service::OtpService;
use super::types::{OtpSentResponse, SendOtpReq, VerifyOtpReq};
use crate::utils::error::Error;

#[utoipa::path(
    post,
    path = "/auth/send-otp",
    tag = "auth",
    request_body = SendOtpReq,
    responses(
        (status = 200, description = "Code issued and dispatched", body = OtpSentResponse),
        (status = 400, description = "Malformed phone number"),
        (status = 500, description = "SMS delivery failed (production)"),
    )
)]
#[post("/auth/send-otp")]
pub async fn send_otp(
    payload: web::Json<SendOtpReq>,
    otp: web::Data<OtpService>,
) -> Result<HttpResponse, Error> {
    let phone = payload
        .phone
        .as_deref()
        .ok_or_else(|| Error::Validation("please provide a phone number".into()))?;
    let dispatch = otp.request(phone).await?;
    Ok(HttpResponse::Ok().json(OtpSentResponse {
        message: dispatch.message,
        dev_otp: dispatch.dev_otp,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpReq,
    responses(
        (status = 200, description = "Phone verified, session issued", body = crate::features::auth::AuthSession),
        (status = 400, description = "Code expired or mismatched"),
        (status = 404, description = "No account for this phone"),
    )
)]
#[post("/auth/verify-otp")]
pub async fn verify_otp(
    payload: web::Json<VerifyOtpReq>,
    otp: web::Data<OtpService>,
) -> Result<HttpResponse, Error> {
    let (Some(phone), Some(code)) = (payload.phone.as_deref(), payload.otp.as_deref()) else {
        return Err(Error::Validation("please provide phone and otp".into()));
    };
    let session = otp.verify(phone, code).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::features::auth::SessionIssuer;
    use crate::features::users::testing::{InMemoryUsers, RecordingSms};
    use crate::utils::token_service::TokenService;

    fn otp_service() -> OtpService {
        let users = Arc::new(InMemoryUsers::new());
        let sms = Arc::new(RecordingSms::new());
        let sessions = SessionIssuer::new(Arc::new(TokenService::new("test-secret", 3600)));
        OtpService::new(users, sms, sessions, true)
    }

    #[actix_web::test]
    async fn send_then_verify_end_to_end() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(otp_service()))
                .service(send_otp)
                .service(verify_otp),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/send-otp")
                .set_json(json!({"phone": "01712345678"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let sent: Value = test::read_body_json(resp).await;
        let code = sent["devOTP"].as_str().unwrap().to_owned();

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/verify-otp")
                .set_json(json!({"phone": "01712345678", "otp": code}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let session: Value = test::read_body_json(resp).await;
        assert_eq!(session["user"]["phoneVerified"], true);
        assert!(!session["token"].as_str().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn missing_phone_is_400() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(otp_service()))
                .service(send_otp),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/auth/send-otp")
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
