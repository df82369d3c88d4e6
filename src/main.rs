mod config;
mod features;
mod infrastructure;
mod swagger;
mod utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::traits::Env;
use crate::config::{AppSettings, DbSettings, OAuthSettings};
use crate::features::auth::{AuthService, SessionIssuer};
use crate::features::clients::{ConsoleMailer, ConsoleSms, EmailClient, Mailer, SmsClient, SmsSender};
use crate::features::email_verification::EmailVerificationService;
use crate::features::oauth::{FacebookOAuth, GoogleOAuth, OAuthService};
use crate::features::otp::OtpService;
use crate::features::users::{PgUserStore, UserStore};
use crate::infrastructure::persistence::db;
use crate::swagger::ApiDoc;
use crate::utils::token_service::TokenService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(true)
        .with_line_number(true)
        .init();

    let settings = AppSettings::from_env().expect("Failed to load app settings");
    let db_settings = DbSettings::from_env().expect("Failed to load database settings");
    let oauth_settings = OAuthSettings::from_env().expect("Failed to load oauth settings");

    let pool = db::create_pool(&db_settings.database_url)
        .await
        .expect("Failed to create database pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let dev_mode = settings.is_development();

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let sessions = SessionIssuer::new(Arc::new(TokenService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    )));

    let mailer: Arc<dyn Mailer> = match EmailClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) if dev_mode => {
            tracing::warn!(error = %e, "sendgrid not configured, using console mail transport");
            Arc::new(ConsoleMailer)
        }
        Err(e) => panic!("Failed to configure email client: {e}"),
    };
    let sms: Arc<dyn SmsSender> = match SmsClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) if dev_mode => {
            tracing::warn!(error = %e, "twilio not configured, using console sms transport");
            Arc::new(ConsoleSms)
        }
        Err(e) => panic!("Failed to configure sms client: {e}"),
    };

    let auth_service = AuthService::new(users.clone(), sessions.clone());
    let otp_service = OtpService::new(users.clone(), sms, sessions.clone(), dev_mode);
    let email_verification_service = EmailVerificationService::new(
        users.clone(),
        mailer,
        sessions.clone(),
        settings.frontend_url.clone(),
        dev_mode,
    );
    let oauth_service = OAuthService::new(
        users,
        sessions,
        GoogleOAuth::new(&oauth_settings),
        FacebookOAuth::new(&oauth_settings),
        settings.frontend_url.clone(),
    );

    let openapi = ApiDoc::openapi();
    let bind_addr = settings.bind_addr.clone();
    tracing::info!(addr = %bind_addr, environment = %settings.environment, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]),
            )
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(otp_service.clone()))
            .app_data(web::Data::new(email_verification_service.clone()))
            .app_data(web::Data::new(oauth_service.clone()))
            .service(
                SwaggerUi::new("/swagger/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(features::auth::routes::register)
            .service(features::auth::routes::login)
            .service(features::auth::routes::me)
            .service(features::auth::routes::update_profile)
            .service(features::auth::routes::logout)
            .service(features::otp::routes::send_otp)
            .service(features::otp::routes::verify_otp)
            .service(features::email_verification::routes::send_email_verification)
            .service(features::email_verification::routes::verify_email)
            .service(features::oauth::routes::google_start)
            .service(features::oauth::routes::google_callback)
            .service(features::oauth::routes::facebook_start)
            .service(features::oauth::routes::facebook_callback)
            .service(features::system::routes::health)
            .service(features::system::routes::version)
    })
    .bind(bind_addr)?
    .run()
    .await
}
