use chrono::Utc;

/// 订单号：TSF- 加毫秒时间戳的后 6 位
pub fn generate_order_number() -> String {
    order_number_from_millis(Utc::now().timestamp_millis())
}

fn order_number_from_millis(millis: i64) -> String {
    format!("TSF-{:06}", millis.rem_euclid(1_000_000))
}
