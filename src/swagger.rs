use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::order::create_order,
        handlers::contact::submit_contact,
    ),
    components(
        schemas(
            ApiResponse,
            CreateOrderRequest,
            CustomerDetails,
            Coordinates,
            CartItem,
            OrderSummary,
            ContactFormRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "order", description = "Checkout order intake"),
        (name = "contact", description = "Contact form"),
    ),
    info(
        title = "Astra Storefront API",
        version = "1.0.0",
        description = "Order intake and contact form endpoints of the Astra storefront"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
