pub mod contact;
pub mod health;
pub mod order;

pub use contact::contact_config;
pub use health::health_config;
pub use order::order_config;

use crate::error::AppError;
use actix_web::web;

/// JSON 解析失败按请求错误（400）处理，响应格式与其它错误一致
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid JSON payload: {err}")).into()
    })
}

pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(health_config)
        .configure(order_config)
        .configure(contact_config);
}
