use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpReq {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpReq {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

/// `devOTP` is populated only when the service runs in development;
/// production responses never carry the code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpSentResponse {
    pub message: String,
    #[serde(rename = "devOTP", skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
}
