use actix_web::{HttpResponse, ResponseError, Result, web};
use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    post,
    path = "/create-order",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "订单已保存（通知失败不影响结果）", body = ApiResponse),
        (status = 400, description = "缺少 customer / items / summary 或 JSON 无效", body = ApiResponse),
        (status = 500, description = "商品无法解析或写库失败", body = ApiResponse)
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(request.into_inner()).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/create-order", web::post().to(create_order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MailConfig, SiteConfig, WhatsAppConfig};
    use crate::database::order_repository::fake::InMemoryOrderRepository;
    use crate::database::settings_repository::fake::InMemorySettingsRepository;
    use crate::external::mailer::fake::RecordingMailer;
    use crate::external::whatsapp::fake::RecordingWhatsApp;
    use crate::handlers::json_config;
    use crate::services::{OrderNotifier, SettingsService};
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;

    fn service(repo: Arc<InMemoryOrderRepository>) -> OrderService {
        let settings = SettingsService::new(
            Arc::new(InMemorySettingsRepository::default()),
            MailConfig::default(),
            WhatsAppConfig::default(),
        );
        let notifier = OrderNotifier::new(
            Arc::new(RecordingMailer::default()),
            Arc::new(RecordingWhatsApp::default()),
            settings,
            SiteConfig::default(),
        );
        OrderService::new(repo, notifier)
    }

    fn payload(item_id: &str) -> serde_json::Value {
        serde_json::json!({
            "customer": {
                "name": "Usman",
                "email": "usman@example.com",
                "phone": "+923214567890",
                "city": "Peshawar",
                "address": "University Road"
            },
            "items": [{ "id": item_id, "name": "Black Tourmaline", "qty": 1, "price": 1100.0 }],
            "summary": { "subtotal": 1100.0, "deliveryFee": 150.0, "total": 1250.0, "belowMinimum": false }
        })
    }

    #[actix_web::test]
    async fn test_create_order_returns_ok() {
        let repo = Arc::new(InMemoryOrderRepository::default().with_product("prod-7", "black-tourmaline"));
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(service(repo.clone())))
                .service(web::scope("/api").configure(order_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .set_json(payload("black-tourmaline"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "ok": true }));
        assert_eq!(repo.orders.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_fields_is_bad_request() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(service(repo.clone())))
                .service(web::scope("/api").configure(order_config)),
        )
        .await;

        let mut body = payload("prod-7");
        body.as_object_mut().unwrap().remove("items");
        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Missing required fields");
        assert!(repo.orders.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_product_is_server_error() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(service(repo.clone())))
                .service(web::scope("/api").configure(order_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .set_json(payload("moonstone"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert!(repo.orders.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new(service(Arc::new(InMemoryOrderRepository::default()))))
                .service(web::scope("/api").configure(order_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"customer\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["ok"], false);
    }
}
