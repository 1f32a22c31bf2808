use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 对外接口统一响应：`{ ok, error?, message? }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
            message: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_serializes_without_optional_fields() {
        let value = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": true }));
    }
}
