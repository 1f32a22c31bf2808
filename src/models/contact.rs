use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 联系表单；字段全部可选，校验在 ContactService 中完成
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactFormRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// 校验并清洗后的联系表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
