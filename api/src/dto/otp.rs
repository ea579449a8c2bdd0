use serde::{Deserialize, Serialize};

/// Every field is optional so a missing one is reported as
/// `missing_parameters` rather than a JSON error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestBody {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyBody {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub purpose: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequestResponse {
    pub message: String,
    pub resent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
