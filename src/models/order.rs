use crate::entities::PaymentStatus;
use crate::error::{AppError, AppResult};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 结算页提交的订单
///
/// customer / items / summary 为必填，但声明为 Option，
/// 以便缺失时返回统一的 400 而不是 JSON 解析错误。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: Option<CustomerDetails>,
    pub items: Option<Vec<CartItem>>,
    pub summary: Option<OrderSummary>,
    pub payment_screenshot: Option<String>,
    pub cash_on_delivery: Option<bool>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub alternative_phone: Option<String>,
    pub city: String,
    pub address: String,
    pub landmark: Option<String>,
    pub notes: Option<String>,
    pub coords: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn map_link(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// 购物车行；id 可能是商品主键，也可能是 slug
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub qty: u32,
    pub price: f64,
    pub image: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.qty as f64
    }
}

/// 前端计算好的金额汇总（卢比）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
    #[serde(default)]
    pub below_minimum: bool,
    pub discount_amount: Option<f64>,
}

impl OrderSummary {
    pub fn discount(&self) -> f64 {
        self.discount_amount.unwrap_or(0.0)
    }
}

/// 通过必填校验后的订单
#[derive(Debug, Clone)]
pub struct OrderIntake {
    pub customer: CustomerDetails,
    pub items: Vec<CartItem>,
    pub summary: OrderSummary,
    pub payment_screenshot: Option<String>,
    pub cash_on_delivery: bool,
    pub coupon_code: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_intake(self) -> AppResult<OrderIntake> {
        let (Some(customer), Some(items), Some(summary)) = (self.customer, self.items, self.summary)
        else {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ));
        };

        Ok(OrderIntake {
            customer,
            items,
            summary,
            payment_screenshot: self.payment_screenshot.filter(|s| !s.trim().is_empty()),
            cash_on_delivery: self.cash_on_delivery.unwrap_or(false),
            coupon_code: self
                .coupon_code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

impl OrderIntake {
    /// 入库的支付方式
    pub fn payment_method(&self) -> &'static str {
        if self.cash_on_delivery {
            "Cash on Delivery"
        } else {
            "Prepaid"
        }
    }

    /// 货到付款待收款，其余视为已付款（凭截图人工核对）
    pub fn payment_status(&self) -> PaymentStatus {
        if self.cash_on_delivery {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Paid
        }
    }

    /// 通知中展示的支付方式
    pub fn payment_label(&self) -> &'static str {
        if self.cash_on_delivery {
            "Cash on Delivery / Pay Later"
        } else if self.payment_screenshot.is_some() {
            "Prepaid (Payment Screenshot Provided)"
        } else {
            "Prepaid"
        }
    }
}

/// 写库用的订单
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_id: Option<String>,
    pub customer: NewOrderCustomer,
    pub payment_screenshot: Option<String>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub alternative_phone: Option<String>,
    pub city: String,
    pub address: String,
    pub landmark: Option<String>,
    pub notes: Option<String>,
    pub coordinates: Option<serde_json::Value>,
}

impl From<&CustomerDetails> for NewOrderCustomer {
    fn from(c: &CustomerDetails) -> Self {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_ref().filter(|s| !s.trim().is_empty()).cloned()
        }
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            alternative_phone: non_empty(&c.alternative_phone),
            city: c.city.clone(),
            address: c.address.clone(),
            landmark: non_empty(&c.landmark),
            notes: non_empty(&c.notes),
            coordinates: c
                .coords
                .map(|p| serde_json::json!({ "lat": p.lat, "lng": p.lng })),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// 优惠券使用记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewCouponUsage {
    pub coupon_id: String,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub discount_amount: Decimal,
}

/// 已保存订单的摘要，用于通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOrder {
    pub id: String,
    pub order_number: String,
}
