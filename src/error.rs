use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed: {}", .0.join("; "))]
    InvalidForm(Vec<String>),

    #[error("Order not saved: {0}")]
    OrderNotSaved(String),

    #[error("Order number already taken: {0}")]
    DuplicateOrderNumber(String),

    #[error("Mail error: {0}")]
    MailError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 对外暴露的错误信息（内部细节只写日志）
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) => msg.clone(),
            AppError::InvalidForm(_) => "Validation failed".to_string(),
            AppError::OrderNotSaved(_) => "Failed to save order to database".to_string(),
            AppError::ConfigError(msg) => msg.clone(),
            AppError::MailError(_) | AppError::ExternalApiError(_) | AppError::ReqwestError(_) => {
                "Failed to send message. Please try again later.".to_string()
            }
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::InvalidForm(errors) => log::warn!("Validation failed: {errors:?}"),
            AppError::OrderNotSaved(msg) => log::error!("Database error while saving order: {msg}"),
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            _ => log::error!("Internal error: {self}"),
        }

        let mut body = json!({
            "ok": false,
            "error": self.public_message(),
        });
        if let AppError::InvalidForm(errors) = self {
            body["errors"] = json!(errors);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
