use crate::database::OrderRepository;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{NotificationReport, OrderNotifier};
use crate::utils::{generate_order_number, line_total, to_decimal};
use sea_orm::prelude::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// 订单号只有 6 位毫秒数，约 16.7 分钟循环一次；冲突时换号重试
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// 下单结果：已保存的订单与（尽力而为的）通知结果
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: SavedOrder,
    pub notifications: NotificationReport,
}

#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    notifier: OrderNotifier,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>, notifier: OrderNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// 校验 -> 入库 -> 关联优惠券 -> 发送通知
    ///
    /// 只有参数缺失和写库失败会返回错误；订单保存之后的任何失败只记录日志。
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<CreatedOrder> {
        let order = request.into_intake()?;

        let customer_id = self
            .repository
            .find_customer_id_by_email(&order.customer.email)
            .await
            .map_err(not_saved)?;

        let new_order = self.build_order(&order, customer_id.clone()).await?;
        let discount_amount = new_order.discount_amount;
        let saved = self.save_order(new_order).await?;

        log::info!(
            "Order {} saved with {} item(s), total {:.2}",
            saved.order_number,
            order.items.len(),
            order.summary.total
        );

        if let Some(code) = &order.coupon_code {
            if discount_amount > Decimal::ZERO {
                if let Err(e) = self
                    .link_coupon(code, &saved, customer_id, discount_amount)
                    .await
                {
                    log::error!(
                        "Failed to link coupon {code} to order {}: {e}",
                        saved.order_number
                    );
                }
            }
        }

        let notifications = self
            .notifier
            .notify_order(&saved.order_number, &order)
            .await;

        Ok(CreatedOrder {
            order: saved,
            notifications,
        })
    }

    async fn save_order(&self, mut new_order: NewOrder) -> AppResult<SavedOrder> {
        let mut attempt = 1;
        loop {
            match self.repository.create_order(new_order.clone()).await {
                Ok(saved) => return Ok(saved),
                Err(AppError::DuplicateOrderNumber(number)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    log::warn!("Order number {number} already taken, retrying with a new one");
                    // 换到下一毫秒再生成
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    new_order.order_number = generate_order_number();
                    attempt += 1;
                }
                Err(e) => return Err(not_saved(e)),
            }
        }
    }

    /// 解析每个购物车行对应的商品并换算金额；任一行不合法则整单失败，不写库
    async fn build_order(
        &self,
        order: &OrderIntake,
        customer_id: Option<String>,
    ) -> AppResult<NewOrder> {
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product_id = self.resolve_product(&item.id).await?;
            let quantity = i32::try_from(item.qty)
                .map_err(|_| AppError::ValidationError(format!("Invalid quantity for {}", item.name)))?;
            let unit_price = to_decimal(item.price, &item.name)?;
            let total_price = line_total(unit_price, quantity, &item.name)?;

            items.push(NewOrderItem {
                product_id,
                product_name: item.name.clone(),
                product_image_url: item.image.clone().filter(|s| !s.is_empty()),
                quantity,
                unit_price,
                total_price,
            });
        }

        let summary = &order.summary;
        Ok(NewOrder {
            order_number: generate_order_number(),
            customer_id,
            customer: NewOrderCustomer::from(&order.customer),
            payment_screenshot: order.payment_screenshot.clone(),
            subtotal: to_decimal(summary.subtotal, "subtotal")?,
            delivery_fee: to_decimal(summary.delivery_fee, "delivery fee")?,
            discount_amount: to_decimal(summary.discount(), "discount")?,
            total_amount: to_decimal(summary.total, "total")?,
            payment_status: order.payment_status(),
            payment_method: order.payment_method().to_string(),
            items,
        })
    }

    /// 先按主键查，再按 slug 查
    async fn resolve_product(&self, reference: &str) -> AppResult<String> {
        if let Some(id) = self
            .repository
            .find_product_id_by_id(reference)
            .await
            .map_err(not_saved)?
        {
            return Ok(id);
        }

        self.repository
            .find_product_id_by_slug(reference)
            .await
            .map_err(not_saved)?
            .ok_or_else(|| AppError::OrderNotSaved(format!("Product not found: {reference}")))
    }

    /// 不在订单事务内；失败时订单保留，used_count 可能已经加一
    async fn link_coupon(
        &self,
        code: &str,
        saved: &SavedOrder,
        customer_id: Option<String>,
        discount_amount: Decimal,
    ) -> AppResult<()> {
        let Some(coupon_id) = self.repository.find_coupon_id_by_code(code).await? else {
            log::warn!("Coupon {code} not found, order {} kept without usage record", saved.order_number);
            return Ok(());
        };

        self.repository.increment_coupon_usage(&coupon_id).await?;
        self.repository
            .create_coupon_usage(NewCouponUsage {
                coupon_id,
                order_id: saved.id.clone(),
                customer_id,
                discount_amount,
            })
            .await?;

        log::info!("Coupon {code} applied to order {}", saved.order_number);
        Ok(())
    }
}

fn not_saved(err: AppError) -> AppError {
    match err {
        AppError::OrderNotSaved(_) | AppError::ValidationError(_) => err,
        other => AppError::OrderNotSaved(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MailConfig, SiteConfig, WhatsAppConfig};
    use crate::database::order_repository::fake::InMemoryOrderRepository;
    use crate::database::settings_repository::fake::InMemorySettingsRepository;
    use crate::entities::PaymentStatus;
    use crate::external::mailer::fake::RecordingMailer;
    use crate::external::whatsapp::fake::RecordingWhatsApp;
    use crate::services::{Delivery, SettingsService};
    use std::str::FromStr;

    struct Harness {
        repo: Arc<InMemoryOrderRepository>,
        mailer: Arc<RecordingMailer>,
        whatsapp: Arc<RecordingWhatsApp>,
        service: OrderService,
    }

    fn harness_with(
        repo: InMemoryOrderRepository,
        mailer: RecordingMailer,
        whatsapp: RecordingWhatsApp,
    ) -> Harness {
        let settings = InMemorySettingsRepository::default()
            .with("smtp_host", "smtp.example.com")
            .with("smtp_user", "orders@example.com")
            .with("smtp_pass", "secret")
            .with("notifications_order_whatsapp_numbers", "+923001110000,+923002220000")
            .with("whatsapp_access_token", "token")
            .with("whatsapp_phone_number_id", "1098765");
        let settings = SettingsService::new(
            Arc::new(settings),
            MailConfig::default(),
            WhatsAppConfig::default(),
        );

        let repo = Arc::new(repo);
        let mailer = Arc::new(mailer);
        let whatsapp = Arc::new(whatsapp);
        let notifier = OrderNotifier::new(
            mailer.clone(),
            whatsapp.clone(),
            settings,
            SiteConfig::default(),
        );
        Harness {
            service: OrderService::new(repo.clone(), notifier),
            repo,
            mailer,
            whatsapp,
        }
    }

    fn harness(repo: InMemoryOrderRepository) -> Harness {
        harness_with(repo, RecordingMailer::default(), RecordingWhatsApp::default())
    }

    fn catalog() -> InMemoryOrderRepository {
        InMemoryOrderRepository::default()
            .with_product("prod-001", "rose-quartz")
            .with_product("prod-002", "selenite-wand")
    }

    fn request(discount: Option<f64>, coupon: Option<&str>) -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "customer": {
                "name": "Ayesha Khan",
                "email": "ayesha@example.com",
                "phone": "+923001234567",
                "city": "Lahore",
                "address": "12 Mall Road",
                "coords": null
            },
            "items": [
                { "id": "prod-001", "name": "Rose Quartz", "qty": 2, "price": 1500.0 },
                { "id": "selenite-wand", "name": "Selenite Wand", "qty": 1, "price": 700.5,
                  "image": "/images/selenite.png" }
            ],
            "summary": {
                "subtotal": 3700.5, "deliveryFee": 0.0, "total": 3700.5 - discount.unwrap_or(0.0),
                "belowMinimum": false, "discountAmount": discount
            },
            "cashOnDelivery": true,
            "couponCode": coupon
        }))
        .unwrap()
    }

    #[actix_web::test]
    async fn test_creates_one_order_with_one_item_per_line() {
        let h = harness(catalog().with_customer("ayesha@example.com", "cust-9"));
        let created = h.service.create_order(request(None, None)).await.unwrap();

        let orders = h.repo.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.order_number, created.order.order_number);
        assert_eq!(order.customer_id.as_deref(), Some("cust-9"));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id, "prod-001");
        // slug 解析到主键
        assert_eq!(order.items[1].product_id, "prod-002");
        assert_eq!(order.items[0].total_price, Decimal::from_str("3000.00").unwrap());
        assert_eq!(order.items[1].unit_price, Decimal::from_str("700.50").unwrap());
        assert_eq!(order.payment_method, "Cash on Delivery");
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.discount_amount, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn test_unknown_product_fails_without_order() {
        let h = harness(InMemoryOrderRepository::default().with_product("prod-001", "rose-quartz"));
        let err = h.service.create_order(request(None, None)).await.unwrap_err();

        assert!(matches!(err, AppError::OrderNotSaved(ref msg) if msg.contains("selenite-wand")));
        assert!(h.repo.orders.lock().unwrap().is_empty());
        assert_eq!(*h.mailer.attempts.lock().unwrap(), 0);
        assert!(h.whatsapp.attempted.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_missing_sections_rejected_before_database() {
        let h = harness(catalog());
        let mut req = request(None, None);
        req.summary = None;
        let err = h.service.create_order(req).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(h.repo.orders.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_write_failure_sends_no_notifications() {
        let repo = InMemoryOrderRepository {
            fail_order_write: true,
            ..catalog()
        };
        let h = harness(repo);
        let err = h.service.create_order(request(None, None)).await.unwrap_err();

        assert!(matches!(err, AppError::OrderNotSaved(_)));
        assert_eq!(*h.mailer.attempts.lock().unwrap(), 0);
        assert!(h.whatsapp.attempted.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_coupon_usage_recorded_for_positive_discount() {
        let h = harness(catalog().with_coupon("WELCOME10", "coupon-1"));
        let created = h
            .service
            .create_order(request(Some(370.05), Some("WELCOME10")))
            .await
            .unwrap();

        assert_eq!(h.repo.coupon_used_count("WELCOME10"), 1);
        let usages = h.repo.coupon_usages.lock().unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].coupon_id, "coupon-1");
        assert_eq!(usages[0].order_id, created.order.id);
        assert_eq!(usages[0].customer_id, None);
        assert_eq!(usages[0].discount_amount, Decimal::from_str("370.05").unwrap());
    }

    #[actix_web::test]
    async fn test_zero_discount_records_no_coupon_usage() {
        let h = harness(catalog().with_coupon("WELCOME10", "coupon-1"));
        h.service
            .create_order(request(Some(0.0), Some("WELCOME10")))
            .await
            .unwrap();

        assert_eq!(h.repo.coupon_used_count("WELCOME10"), 0);
        assert!(h.repo.coupon_usages.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_coupon_failure_keeps_order() {
        let repo = InMemoryOrderRepository {
            fail_coupon_usage: true,
            ..catalog().with_coupon("WELCOME10", "coupon-1")
        };
        let h = harness(repo);
        let created = h
            .service
            .create_order(request(Some(100.0), Some("WELCOME10")))
            .await;

        assert!(created.is_ok());
        assert_eq!(h.repo.orders.lock().unwrap().len(), 1);
        // 计数已加一但没有使用记录
        assert_eq!(h.repo.coupon_used_count("WELCOME10"), 1);
        assert!(h.repo.coupon_usages.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unreachable_smtp_still_succeeds() {
        let mailer = RecordingMailer {
            unreachable: true,
            ..Default::default()
        };
        let h = harness_with(catalog(), mailer, RecordingWhatsApp::default());
        let created = h.service.create_order(request(None, None)).await.unwrap();

        assert!(matches!(created.notifications.admin_email, Delivery::Failed(_)));
        assert!(matches!(created.notifications.customer_email, Delivery::Failed(_)));
        assert_eq!(h.repo.orders.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_failing_whatsapp_number_does_not_stop_the_other() {
        let whatsapp = RecordingWhatsApp {
            failing: ["+923001110000".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let h = harness_with(catalog(), RecordingMailer::default(), whatsapp);
        let created = h.service.create_order(request(None, None)).await.unwrap();

        assert_eq!(h.whatsapp.attempted.lock().unwrap().len(), 2);
        assert_eq!(
            h.whatsapp.sent.lock().unwrap()[0].0,
            "+923002220000".to_string()
        );
        assert_eq!(created.notifications.whatsapp.len(), 2);
    }

    #[actix_web::test]
    async fn test_line_total_overflow_rejected_without_order() {
        let h = harness(catalog());
        let mut req = request(None, None);
        if let Some(items) = req.items.as_mut() {
            items[0].price = 5e28;
        }
        let err = h.service.create_order(req).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("Rose Quartz")));
        assert!(h.repo.orders.lock().unwrap().is_empty());
        assert!(h.repo.order_write_attempts.lock().unwrap().is_empty());
        assert_eq!(*h.mailer.attempts.lock().unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_out_of_range_amount_rejected_instead_of_zeroed() {
        let h = harness(catalog());
        let mut req = request(None, None);
        if let Some(summary) = req.summary.as_mut() {
            summary.total = 1e30;
        }
        let err = h.service.create_order(req).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("total")));
        assert!(h.repo.orders.lock().unwrap().is_empty());
        assert!(h.whatsapp.attempted.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_coupon_code_is_ignored() {
        let h = harness(catalog().with_coupon("WELCOME10", "coupon-1"));
        let created = h
            .service
            .create_order(request(Some(100.0), Some("NOPE")))
            .await;

        assert!(created.is_ok());
        assert_eq!(h.repo.orders.lock().unwrap().len(), 1);
        assert_eq!(h.repo.coupon_used_count("WELCOME10"), 0);
        assert_eq!(h.repo.coupon_used_count("NOPE"), 0);
        assert!(h.repo.coupon_usages.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_coupon_usage_links_existing_customer() {
        let h = harness(
            catalog()
                .with_customer("ayesha@example.com", "cust-9")
                .with_coupon("WELCOME10", "coupon-1"),
        );
        h.service
            .create_order(request(Some(250.0), Some("WELCOME10")))
            .await
            .unwrap();

        let usages = h.repo.coupon_usages.lock().unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].customer_id.as_deref(), Some("cust-9"));
        assert_eq!(usages[0].discount_amount, Decimal::from_str("250.00").unwrap());
    }

    #[actix_web::test]
    async fn test_coupon_lookup_error_keeps_order() {
        let repo = InMemoryOrderRepository {
            fail_coupon_lookup: true,
            ..catalog().with_coupon("WELCOME10", "coupon-1")
        };
        let h = harness(repo);
        let created = h
            .service
            .create_order(request(Some(100.0), Some("WELCOME10")))
            .await;

        assert!(created.is_ok());
        assert_eq!(h.repo.orders.lock().unwrap().len(), 1);
        assert_eq!(h.repo.coupon_used_count("WELCOME10"), 0);
        assert!(h.repo.coupon_usages.lock().unwrap().is_empty());
        // 通知照常发送
        assert_eq!(*h.mailer.attempts.lock().unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_taken_order_number_is_regenerated() {
        let repo = catalog();
        *repo.duplicate_numbers.lock().unwrap() = 1;
        let h = harness(repo);
        let created = h.service.create_order(request(None, None)).await.unwrap();

        let attempts = h.repo.order_write_attempts.lock().unwrap();
        assert_eq!(attempts.len(), 2);
        assert_ne!(attempts[0], attempts[1]);
        assert_eq!(created.order.order_number, attempts[1]);
        assert_eq!(h.repo.orders.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_order_number_retries_are_bounded() {
        let repo = catalog();
        *repo.duplicate_numbers.lock().unwrap() = ORDER_NUMBER_ATTEMPTS;
        let h = harness(repo);
        let err = h.service.create_order(request(None, None)).await.unwrap_err();

        assert!(matches!(err, AppError::OrderNotSaved(_)));
        assert_eq!(h.repo.order_write_attempts.lock().unwrap().len(), ORDER_NUMBER_ATTEMPTS);
        assert_eq!(*h.mailer.attempts.lock().unwrap(), 0);
    }
}
