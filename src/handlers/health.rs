use actix_web::{HttpResponse, web};
use crate::models::ApiResponse;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "服务可用", body = ApiResponse))
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok())
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
