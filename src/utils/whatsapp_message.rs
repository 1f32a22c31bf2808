use crate::models::OrderIntake;
use crate::utils::format_rupees;
use std::fmt::Write;

/// 发给管理员的 WhatsApp 订单摘要（WhatsApp 文本格式，*粗体*）
pub fn format_order_message(order_number: &str, order: &OrderIntake) -> String {
    let c = &order.customer;
    let mut msg = format!("🛒 *New Order Received*\n\n*Order #:* {order_number}\n\n");

    let _ = writeln!(msg, "*Customer:* {}", c.name);
    let _ = writeln!(msg, "*Phone:* {}", c.phone);
    if let Some(alt) = c.alternative_phone.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(msg, "*Alt. Phone:* {alt}");
    }
    let _ = writeln!(msg, "*Email:* {}", c.email);
    let _ = writeln!(msg, "*Address:* {}, {}", c.address, c.city);
    if let Some(coords) = c.coords {
        let _ = writeln!(msg, "*Map:* {}", coords.map_link());
    }

    msg.push_str("\n*Items:*\n");
    for item in &order.items {
        let _ = writeln!(
            msg,
            "• {} x{} = {}",
            item.name,
            item.qty,
            format_rupees(item.line_total())
        );
    }

    let summary = &order.summary;
    let _ = write!(msg, "\n*Subtotal:* {}\n", format_rupees(summary.subtotal));
    if summary.delivery_fee > 0.0 {
        let _ = writeln!(msg, "*Delivery:* {}", format_rupees(summary.delivery_fee));
    }
    if summary.discount() > 0.0 {
        let _ = writeln!(msg, "*Discount:* -{}", format_rupees(summary.discount()));
    }
    let _ = writeln!(msg, "*Total:* {}", format_rupees(summary.total));
    let _ = write!(msg, "\n*Payment:* {}", order.payment_label());
    if let Some(url) = &order.payment_screenshot {
        let _ = write!(msg, "\n*Screenshot:* {url}");
    }
    msg
}
