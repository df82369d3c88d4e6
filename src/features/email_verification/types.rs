use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailVerificationReq {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// `dev_verification_url` is populated only in development; production
/// responses never expose the raw link token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSentResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_verification_url: Option<String>,
}
