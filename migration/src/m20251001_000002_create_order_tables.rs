use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    CustomerId,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    CustomerAlternativePhone,
    CustomerCity,
    CustomerAddress,
    CustomerLandmark,
    CustomerCoordinates,
    CustomerNotes,
    PaymentScreenshot,
    Subtotal,
    DeliveryFee,
    DiscountAmount,
    TaxAmount,
    TotalAmount,
    Status,
    PaymentStatus,
    PaymentMethod,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductName,
    ProductImageUrl,
    VariationName,
    Quantity,
    UnitPrice,
    DiscountAmount,
    TotalPrice,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderStatusHistory {
    Table,
    Id,
    OrderId,
    Status,
    Notes,
    CreatedAt,
}

/// 优惠券使用记录（订单 / 客户 / 优惠券 三元组）
#[derive(DeriveIden)]
enum CouponUsages {
    Table,
    Id,
    CouponId,
    OrderId,
    CustomerId,
    DiscountAmount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // PostgreSQL 没有 CREATE TYPE IF NOT EXISTS，用 DO 块保证幂等
        let conn = manager.get_connection();
        conn.execute_unprepared(
            r#"
            DO $$ BEGIN
                CREATE TYPE order_status AS ENUM (
                    'pending', 'confirmed', 'processing', 'shipped',
                    'delivered', 'cancelled', 'refunded'
                );
            EXCEPTION WHEN duplicate_object THEN NULL; END $$;
            "#,
        )
        .await?;
        conn.execute_unprepared(
            r#"
            DO $$ BEGIN
                CREATE TYPE payment_status AS ENUM ('pending', 'paid', 'failed', 'refunded');
            EXCEPTION WHEN duplicate_object THEN NULL; END $$;
            "#,
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Orders::OrderNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::CustomerId).string_len(64).null())
                    .col(ColumnDef::new(Orders::CustomerName).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerEmail).string_len(255).not_null())
                    .col(ColumnDef::new(Orders::CustomerPhone).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Orders::CustomerAlternativePhone)
                            .string_len(32)
                            .null(),
                    )
                    .col(ColumnDef::new(Orders::CustomerCity).string_len(128).not_null())
                    .col(ColumnDef::new(Orders::CustomerAddress).text().not_null())
                    .col(ColumnDef::new(Orders::CustomerLandmark).text().null())
                    .col(ColumnDef::new(Orders::CustomerCoordinates).json_binary().null())
                    .col(ColumnDef::new(Orders::CustomerNotes).text().null())
                    .col(ColumnDef::new(Orders::PaymentScreenshot).text().null())
                    .col(ColumnDef::new(Orders::Subtotal).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::DeliveryFee).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(Orders::DiscountAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::TaxAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Orders::TotalAmount).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .custom(Alias::new("order_status"))
                            .not_null()
                            .default(Expr::cust("'pending'")),
                    )
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .custom(Alias::new("payment_status"))
                            .not_null()
                            .default(Expr::cust("'pending'")),
                    )
                    .col(ColumnDef::new(Orders::PaymentMethod).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_customer_email")
                    .table(Orders::Table)
                    .col(Orders::CustomerEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).string_len(64).not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).string_len(64).not_null())
                    .col(ColumnDef::new(OrderItems::ProductName).string_len(255).not_null())
                    .col(ColumnDef::new(OrderItems::ProductImageUrl).text().null())
                    .col(ColumnDef::new(OrderItems::VariationName).string_len(255).null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(OrderItems::UnitPrice).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(OrderItems::DiscountAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(OrderItems::TotalPrice).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(OrderItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_product")
                            .from(OrderItems::Table, OrderItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderStatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::OrderId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderStatusHistory::Status)
                            .custom(Alias::new("order_status"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderStatusHistory::Notes).text().null())
                    .col(
                        ColumnDef::new(OrderStatusHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_status_history_order")
                            .from(OrderStatusHistory::Table, OrderStatusHistory::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CouponUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CouponUsages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CouponUsages::CouponId).string_len(64).not_null())
                    .col(ColumnDef::new(CouponUsages::OrderId).string_len(64).not_null())
                    .col(ColumnDef::new(CouponUsages::CustomerId).string_len(64).null())
                    .col(
                        ColumnDef::new(CouponUsages::DiscountAmount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CouponUsages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupon_usages_coupon")
                            .from(CouponUsages::Table, CouponUsages::CouponId)
                            .to(Coupons::Table, Coupons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupon_usages_order")
                            .from(CouponUsages::Table, CouponUsages::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_coupon_usages_customer")
                            .from(CouponUsages::Table, CouponUsages::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CouponUsages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(OrderStatusHistory::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TYPE IF EXISTS payment_status")
            .await?;
        conn.execute_unprepared("DROP TYPE IF EXISTS order_status")
            .await?;
        Ok(())
    }
}
