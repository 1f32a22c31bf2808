pub mod coupon_usages;
pub mod coupons;
pub mod customers;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod products;
pub mod system_settings;

pub use coupon_usages as coupon_usage_entity;
pub use coupons as coupon_entity;
pub use customers as customer_entity;
pub use order_items as order_item_entity;
pub use order_status_history as order_status_history_entity;
pub use orders as order_entity;
pub use products as product_entity;
pub use system_settings as system_setting_entity;

pub use orders::{OrderStatus, PaymentStatus};
