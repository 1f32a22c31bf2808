use actix_web::{HttpResponse, ResponseError, Result, web};
use crate::models::*;
use crate::services::ContactService;

#[utoipa::path(
    post,
    path = "/contact",
    tag = "contact",
    request_body = ContactFormRequest,
    responses(
        (status = 200, description = "消息已发送", body = ApiResponse),
        (status = 400, description = "表单校验失败，errors 中列出各字段错误"),
        (status = 500, description = "邮件服务未配置或发送失败", body = ApiResponse)
    )
)]
pub async fn submit_contact(
    contact_service: web::Data<ContactService>,
    request: web::Json<ContactFormRequest>,
) -> Result<HttpResponse> {
    match contact_service.submit(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
            "Thank you for contacting us! We will get back to you soon.",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn contact_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::post().to(submit_contact));
}
