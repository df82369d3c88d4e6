use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::auth::routes::register,
        features::auth::routes::login,
        features::auth::routes::me,
        features::auth::routes::update_profile,
        features::auth::routes::logout,
        features::otp::routes::send_otp,
        features::otp::routes::verify_otp,
        features::email_verification::routes::send_email_verification,
        features::email_verification::routes::verify_email,
        features::oauth::routes::google_start,
        features::oauth::routes::google_callback,
        features::oauth::routes::facebook_start,
        features::oauth::routes::facebook_callback,
        features::system::routes::health,
        features::system::routes::version,
    ),
    components(schemas(
        features::users::PublicUser,
        features::users::Role,
        features::users::AuthProvider,
        features::users::VerificationStatus,
        features::auth::AuthSession,
        features::auth::types::RegisterReq,
        features::auth::types::LoginReq,
        features::auth::types::UpdateProfileReq,
        features::auth::types::MeResponse,
        features::auth::types::MessageResponse,
        features::otp::types::SendOtpReq,
        features::otp::types::VerifyOtpReq,
        features::otp::types::OtpSentResponse,
        features::email_verification::types::SendEmailVerificationReq,
        features::email_verification::types::VerificationSentResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and account verification"),
        (name = "system", description = "Health and build info"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
