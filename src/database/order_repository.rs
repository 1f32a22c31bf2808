use crate::entities::{
    OrderStatus, coupon_entity as coupons, coupon_usage_entity as coupon_usages,
    customer_entity as customers, order_entity as orders, order_item_entity as order_items,
    order_status_history_entity as history, product_entity as products,
};
use crate::error::{AppError, AppResult};
use crate::models::{NewCouponUsage, NewOrder, SavedOrder};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

/// 订单流程用到的持久化能力
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_product_id_by_id(&self, id: &str) -> AppResult<Option<String>>;

    async fn find_product_id_by_slug(&self, slug: &str) -> AppResult<Option<String>>;

    async fn find_customer_id_by_email(&self, email: &str) -> AppResult<Option<String>>;

    /// 订单、明细与初始状态记录在同一事务中写入；订单号已存在时返回 DuplicateOrderNumber
    async fn create_order(&self, order: NewOrder) -> AppResult<SavedOrder>;

    async fn find_coupon_id_by_code(&self, code: &str) -> AppResult<Option<String>>;

    async fn increment_coupon_usage(&self, coupon_id: &str) -> AppResult<()>;

    async fn create_coupon_usage(&self, usage: NewCouponUsage) -> AppResult<()>;
}

#[derive(Clone)]
pub struct SeaOrmOrderRepository {
    pool: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn find_product_id_by_id(&self, id: &str) -> AppResult<Option<String>> {
        let id = products::Entity::find()
            .select_only()
            .column(products::Column::Id)
            .filter(products::Column::Id.eq(id))
            .into_tuple::<String>()
            .one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_product_id_by_slug(&self, slug: &str) -> AppResult<Option<String>> {
        let id = products::Entity::find()
            .select_only()
            .column(products::Column::Id)
            .filter(products::Column::Slug.eq(slug))
            .into_tuple::<String>()
            .one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn find_customer_id_by_email(&self, email: &str) -> AppResult<Option<String>> {
        let id = customers::Entity::find()
            .select_only()
            .column(customers::Column::Id)
            .filter(customers::Column::Email.eq(email))
            .into_tuple::<String>()
            .one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn create_order(&self, order: NewOrder) -> AppResult<SavedOrder> {
        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();
        let txn = self.pool.begin().await?;

        let customer = order.customer;
        orders::ActiveModel {
            id: Set(order_id.clone()),
            order_number: Set(order.order_number.clone()),
            customer_id: Set(order.customer_id),
            customer_name: Set(customer.name),
            customer_email: Set(customer.email),
            customer_phone: Set(customer.phone),
            customer_alternative_phone: Set(customer.alternative_phone),
            customer_city: Set(customer.city),
            customer_address: Set(customer.address),
            customer_landmark: Set(customer.landmark),
            customer_coordinates: Set(customer.coordinates),
            customer_notes: Set(customer.notes),
            payment_screenshot: Set(order.payment_screenshot),
            subtotal: Set(order.subtotal),
            delivery_fee: Set(order.delivery_fee),
            discount_amount: Set(order.discount_amount),
            tax_amount: Set(Decimal::ZERO),
            total_amount: Set(order.total_amount),
            status: Set(OrderStatus::Pending),
            payment_status: Set(order.payment_status),
            payment_method: Set(order.payment_method),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| order_insert_error(e, &order.order_number))?;

        // 逐条插入；空购物车时 insert_many 会报错
        for item in order.items {
            order_items::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                order_id: Set(order_id.clone()),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name),
                product_image_url: Set(item.product_image_url),
                variation_name: Set(None),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                discount_amount: Set(Decimal::ZERO),
                total_price: Set(item.total_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        history::ActiveModel {
            order_id: Set(order_id.clone()),
            status: Set(OrderStatus::Pending),
            notes: Set(Some("Order created".to_string())),
            created_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(SavedOrder {
            id: order_id,
            order_number: order.order_number,
        })
    }

    async fn find_coupon_id_by_code(&self, code: &str) -> AppResult<Option<String>> {
        let id = coupons::Entity::find()
            .select_only()
            .column(coupons::Column::Id)
            .filter(coupons::Column::Code.eq(code))
            .into_tuple::<String>()
            .one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn increment_coupon_usage(&self, coupon_id: &str) -> AppResult<()> {
        coupons::Entity::update_many()
            .col_expr(
                coupons::Column::UsedCount,
                Expr::col(coupons::Column::UsedCount).add(1),
            )
            .col_expr(coupons::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupons::Column::Id.eq(coupon_id))
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_coupon_usage(&self, usage: NewCouponUsage) -> AppResult<()> {
        coupon_usages::ActiveModel {
            coupon_id: Set(usage.coupon_id),
            order_id: Set(usage.order_id),
            customer_id: Set(usage.customer_id),
            discount_amount: Set(usage.discount_amount),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(())
    }
}

/// orders 表上唯一的业务唯一键是 order_number
fn order_insert_error(err: DbErr, order_number: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::DuplicateOrderNumber(order_number.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}
