use actix_web::{get, HttpResponse, Result};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/system/health",
    tag = "system",
    responses((status = 200, description = "Service health"))
)]
#[get("/system/health")]
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    })))
}

#[utoipa::path(
    get,
    path = "/system/version",
    tag = "system",
    responses((status = 200, description = "Crate version"))
)]
#[get("/system/version")]
pub async fn version() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
