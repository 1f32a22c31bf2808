use crate::error::{AppError, AppResult};
use rust_decimal::prelude::FromPrimitive;
use sea_orm::prelude::Decimal;

/// 前端传来的浮点金额转为两位小数的 Decimal；超出 Decimal 范围（约 ±7.9e28）或 NaN 时报错
pub fn to_decimal(amount: f64, field: &str) -> AppResult<Decimal> {
    Decimal::from_f64(amount)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| AppError::ValidationError(format!("Invalid amount for {field}")))
}

/// 单价 × 数量，溢出时报错而不是 panic
pub fn line_total(unit_price: Decimal, quantity: i32, field: &str) -> AppResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| AppError::ValidationError(format!("Invalid amount for {field}")))
}

/// 展示用金额，例如 `Rs. 1500.00`
pub fn format_rupees(amount: f64) -> String {
    format!("Rs. {amount:.2}")
}
