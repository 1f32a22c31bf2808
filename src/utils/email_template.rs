//! 订单与联系表单邮件的 HTML / 纯文本模板

use crate::models::{ContactSubmission, OrderIntake};
use crate::utils::format_rupees;
use chrono::{DateTime, Datelike, Utc};
use std::fmt::Write;

/// 邮件页眉页脚使用的公司信息
#[derive(Debug, Clone)]
pub struct Branding {
    pub base_url: String,
    pub company_name: String,
    pub company_email: String,
    pub company_address: String,
    pub company_phone: String,
}

impl Branding {
    pub fn logo_url(&self) -> String {
        format!("{}/images/logo.png", self.base_url.trim_end_matches('/'))
    }

    /// 相对路径的图片补全为站点绝对地址
    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Admin,
    Customer,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const LABEL_CELL: &str = "padding:8px 0;color:#555;font-size:14px;width:40%;";
const VALUE_CELL: &str = "padding:8px 0;color:#2c3e50;font-size:14px;";
const SECTION_TITLE: &str = "margin:0 0 15px;color:#2c3e50;font-size:18px;font-weight:600;border-bottom:2px solid #0073aa;padding-bottom:10px;";

fn detail_row(out: &mut String, label: &str, value_html: &str) {
    let _ = write!(
        out,
        r#"<tr><td style="{LABEL_CELL}"><strong>{label}:</strong></td><td style="{VALUE_CELL}">{value_html}</td></tr>"#
    );
}

fn wrap_document(title: &str, branding: &Branding, content: &str) -> String {
    let company = escape_html(&branding.company_name);
    let mut footer = format!(
        r#"<p style="margin:0 0 10px;color:#ffffff;font-size:14px;font-weight:600;">{company}</p>"#
    );
    if !branding.company_address.is_empty() {
        let _ = write!(
            footer,
            r#"<p style="margin:0 0 5px;color:#b0b0b0;font-size:12px;">{}</p>"#,
            escape_html(&branding.company_address)
        );
    }
    if !branding.company_phone.is_empty() {
        let phone = escape_html(&branding.company_phone);
        let _ = write!(
            footer,
            r#"<p style="margin:0 0 5px;color:#b0b0b0;font-size:12px;">Phone: <a href="tel:{phone}" style="color:#ffffff;text-decoration:none;">{phone}</a></p>"#
        );
    }
    let email = escape_html(&branding.company_email);
    let _ = write!(
        footer,
        r#"<p style="margin:0 0 5px;color:#b0b0b0;font-size:12px;">Email: <a href="mailto:{email}" style="color:#ffffff;text-decoration:none;">{email}</a></p><p style="margin:15px 0 0;color:#b0b0b0;font-size:11px;">&copy; {year} {company}. All rights reserved.</p>"#,
        year = Utc::now().year()
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
</head>
<body style="margin:0;padding:0;background-color:#f5f5f5;font-family:'Helvetica Neue',Helvetica,Arial,sans-serif;">
  <table width="100%" cellpadding="0" cellspacing="0" style="background-color:#f5f5f5;padding:40px 0;">
    <tr><td align="center">
      <table width="600" cellpadding="0" cellspacing="0" style="background-color:#ffffff;border-radius:4px;overflow:hidden;">
        <tr><td style="padding:30px 40px;text-align:center;border-bottom:3px solid #0073aa;">
          <img src="{logo}" alt="{company}" style="max-width:200px;height:auto;display:block;margin:0 auto;" />
        </td></tr>
        <tr><td style="padding:40px;">
{content}
        </td></tr>
        <tr><td style="background-color:#2c3e50;padding:30px 40px;text-align:center;">
{footer}
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#,
        logo = branding.logo_url(),
    )
}

/// 管理员通知 / 客户确认邮件正文
pub fn render_order_html(
    order_number: &str,
    order: &OrderIntake,
    branding: &Branding,
    audience: Audience,
) -> String {
    let customer = &order.customer;
    let name = escape_html(&customer.name);
    let (title, greeting, closing) = match audience {
        Audience::Admin => (
            "New Order Received",
            format!("You have received a new order from {name}."),
            "Please process this order and confirm delivery details with the customer.",
        ),
        Audience::Customer => (
            "Order Confirmation",
            format!("Thank you for your order, {name}! We're processing it now."),
            "We'll send you another email when your order is ready for delivery. If you have any questions, please contact us.",
        ),
    };

    let mut content = String::new();
    let _ = write!(
        content,
        r#"<h1 style="margin:0 0 10px;color:#2c3e50;font-size:24px;font-weight:600;">{title}</h1>
<p style="margin:0 0 20px;color:#0073aa;font-size:16px;font-weight:600;">Order Number: {number}</p>
<p style="margin:0 0 30px;color:#555;font-size:15px;line-height:1.6;">{greeting}</p>"#,
        number = escape_html(order_number),
    );

    // 客户信息
    let mut details = String::new();
    detail_row(&mut details, "Name", &name);
    let email = escape_html(&customer.email);
    detail_row(
        &mut details,
        "Email",
        &format!(r#"<a href="mailto:{email}" style="color:#0073aa;text-decoration:none;">{email}</a>"#),
    );
    let phone = escape_html(&customer.phone);
    detail_row(
        &mut details,
        "Phone",
        &format!(r#"<a href="tel:{phone}" style="color:#0073aa;text-decoration:none;">{phone}</a>"#),
    );
    if let Some(alt) = customer.alternative_phone.as_deref().filter(|s| !s.is_empty()) {
        let alt = escape_html(alt);
        detail_row(
            &mut details,
            "Alternative Phone",
            &format!(r#"<a href="tel:{alt}" style="color:#0073aa;text-decoration:none;">{alt}</a>"#),
        );
    }
    detail_row(&mut details, "City", &escape_html(&customer.city));
    detail_row(&mut details, "Address", &escape_html(&customer.address));
    if let Some(landmark) = customer.landmark.as_deref().filter(|s| !s.is_empty()) {
        detail_row(&mut details, "Landmark", &escape_html(landmark));
    }
    if let Some(coords) = customer.coords {
        detail_row(
            &mut details,
            "Map",
            &format!(
                r#"<a href="{link}" target="_blank" style="color:#0073aa;text-decoration:none;font-weight:600;">View on Google Maps</a> <span style="color:#999;font-size:12px;">({coords})</span>"#,
                link = coords.map_link(),
            ),
        );
    }
    if let Some(notes) = customer.notes.as_deref().filter(|s| !s.is_empty()) {
        detail_row(&mut details, "Notes", &escape_html(notes));
    }
    let _ = write!(
        content,
        r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin-bottom:30px;background-color:#f8f9fa;border-radius:4px;"><tr><td style="padding:20px;">
<h2 style="{SECTION_TITLE}">Customer Details</h2>
<table width="100%" cellpadding="0" cellspacing="0">{details}</table>
</td></tr></table>"#
    );

    // 商品明细
    let mut rows = String::new();
    for item in &order.items {
        let item_name = escape_html(&item.name);
        let image = item
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|src| {
                format!(
                    r#"<img src="{}" alt="{item_name}" style="max-width:60px;height:auto;border:1px solid #e0e0e0;border-radius:4px;margin-top:8px;" />"#,
                    escape_html(&branding.absolute_url(src))
                )
            })
            .unwrap_or_default();
        let _ = write!(
            rows,
            r#"<tr>
<td style="padding:12px;border-bottom:1px solid #e0e0e0;"><strong style="color:#2c3e50;font-size:14px;display:block;">{item_name}</strong>{image}</td>
<td style="padding:12px;border-bottom:1px solid #e0e0e0;text-align:center;">{qty}</td>
<td style="padding:12px;border-bottom:1px solid #e0e0e0;text-align:right;">{price}</td>
<td style="padding:12px;border-bottom:1px solid #e0e0e0;text-align:right;font-weight:600;">{total}</td>
</tr>"#,
            qty = item.qty,
            price = format_rupees(item.price),
            total = format_rupees(item.line_total()),
        );
    }
    let _ = write!(
        content,
        r#"<h2 style="{SECTION_TITLE}">Order Items</h2>
<table width="100%" cellpadding="0" cellspacing="0" style="margin-bottom:30px;border:1px solid #e0e0e0;">
<thead><tr style="background-color:#f8f9fa;"><th style="padding:12px;text-align:left;">Product</th><th style="padding:12px;text-align:center;">Quantity</th><th style="padding:12px;text-align:right;">Price</th><th style="padding:12px;text-align:right;">Total</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
    );

    // 金额汇总；运费为 0 时不显示
    let summary = &order.summary;
    let mut totals = format!(
        r#"<tr><td style="padding:15px;text-align:right;"><strong>Subtotal:</strong></td><td style="padding:15px;text-align:right;width:120px;">{}</td></tr>"#,
        format_rupees(summary.subtotal)
    );
    if summary.delivery_fee > 0.0 {
        let _ = write!(
            totals,
            r#"<tr><td style="padding:15px;text-align:right;"><strong>Delivery Fee:</strong></td><td style="padding:15px;text-align:right;">{}</td></tr>"#,
            format_rupees(summary.delivery_fee)
        );
    }
    if summary.discount() > 0.0 {
        let _ = write!(
            totals,
            r#"<tr><td style="padding:15px;text-align:right;"><strong>Discount:</strong></td><td style="padding:15px;text-align:right;">-{}</td></tr>"#,
            format_rupees(summary.discount())
        );
    }
    let _ = write!(
        totals,
        r#"<tr style="background-color:#0073aa;"><td style="padding:20px;text-align:right;color:#ffffff;"><strong>Order Total:</strong></td><td style="padding:20px;text-align:right;color:#ffffff;font-weight:700;">{}</td></tr>"#,
        format_rupees(summary.total)
    );
    let _ = write!(
        content,
        r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin-bottom:30px;background-color:#f8f9fa;">{totals}</table>"#
    );

    // 支付方式
    let payment_type = order.payment_label();
    let screenshot = order
        .payment_screenshot
        .as_deref()
        .map(|url| {
            let url = escape_html(url);
            format!(
                r#"<p style="margin:0 0 15px;"><a href="{url}" target="_blank" style="color:#0073aa;font-weight:600;">View Payment Screenshot</a></p><img src="{url}" alt="Payment Screenshot" style="max-width:100%;height:auto;border:2px solid #e0e0e0;display:block;" />"#
            )
        })
        .unwrap_or_default();
    let _ = write!(
        content,
        r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin-bottom:30px;background-color:#f8f9fa;"><tr><td style="padding:20px;">
<h2 style="{SECTION_TITLE}">Payment Method</h2>
<p style="margin:0 0 15px;color:#555;font-size:14px;"><strong>Payment Type:</strong> <span style="color:#2c3e50;font-weight:600;">{payment_type}</span></p>
{screenshot}
</td></tr></table>
<p style="margin:30px 0 0;color:#555;font-size:14px;line-height:1.6;">{closing}</p>"#
    );

    wrap_document(title, branding, &content)
}

/// 订单邮件的纯文本版本（管理员与客户共用）
pub fn render_order_text(order_number: &str, order: &OrderIntake) -> String {
    let c = &order.customer;
    let mut text = format!(
        "New Order\n\nOrder Number: {order_number}\n\nName: {}\nEmail: {}\nPhone: {}\n",
        c.name, c.email, c.phone
    );
    if let Some(alt) = c.alternative_phone.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(text, "Alternative Phone: {alt}");
    }
    let _ = writeln!(text, "City: {}", c.city);
    let _ = writeln!(text, "Address: {}", c.address);
    let _ = writeln!(
        text,
        "Landmark: {}",
        c.landmark.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A")
    );
    if let Some(coords) = c.coords {
        let _ = writeln!(text, "Map: {}", coords.map_link());
        let _ = writeln!(text, "Coordinates: {coords}");
    }
    if let Some(notes) = c.notes.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(text, "Notes: {notes}");
    }
    let _ = writeln!(text, "\nPayment Method: {}", order.payment_label());
    if let Some(url) = &order.payment_screenshot {
        let _ = writeln!(text, "Payment Screenshot: {url}");
    }
    text.push_str("\nItems:\n");
    let lines: Vec<String> = order
        .items
        .iter()
        .map(|i| {
            format!(
                "  {} - Qty: {} - Price: {} - Total: {}",
                i.name,
                i.qty,
                format_rupees(i.price),
                format_rupees(i.line_total())
            )
        })
        .collect();
    text.push_str(&lines.join("\n"));

    let summary = &order.summary;
    let _ = write!(text, "\n\nSubtotal: {}\n", format_rupees(summary.subtotal));
    if summary.delivery_fee > 0.0 {
        let _ = writeln!(text, "Delivery Fee: {}", format_rupees(summary.delivery_fee));
    }
    if summary.discount() > 0.0 {
        let _ = writeln!(text, "Discount: -{}", format_rupees(summary.discount()));
    }
    let _ = write!(text, "Order Total: {}", format_rupees(summary.total));
    text
}

pub fn render_contact_html(
    form: &ContactSubmission,
    branding: &Branding,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut details = String::new();
    detail_row(&mut details, "Name", &escape_html(&form.name));
    let email = escape_html(&form.email);
    detail_row(
        &mut details,
        "Email",
        &format!(r#"<a href="mailto:{email}" style="color:#0073aa;text-decoration:none;">{email}</a>"#),
    );
    detail_row(&mut details, "Subject", &escape_html(&form.subject));
    detail_row(
        &mut details,
        "Message",
        &escape_html(&form.message).replace('\n', "<br />"),
    );

    let content = format!(
        r#"<h1 style="margin:0 0 10px;color:#2c3e50;font-size:24px;font-weight:600;">New Contact Form Submission</h1>
<p style="margin:0 0 30px;color:#555;font-size:15px;line-height:1.6;">You have received a new contact form submission from your website.</p>
<table width="100%" cellpadding="0" cellspacing="0" style="margin-bottom:30px;background-color:#f8f9fa;"><tr><td style="padding:20px;">
<h2 style="{SECTION_TITLE}">Contact Details</h2>
<table width="100%" cellpadding="0" cellspacing="0">{details}</table>
</td></tr></table>
<p style="margin:0;color:#999;font-size:12px;">Submitted on: {submitted}</p>"#,
        submitted = submitted_at.format("%A, %B %-d, %Y %H:%M UTC"),
    );

    wrap_document("New Contact Form Submission", branding, &content)
}

pub fn render_contact_text(form: &ContactSubmission, submitted_at: DateTime<Utc>) -> String {
    format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}\n\nSubmitted on: {}",
        form.name,
        form.email,
        form.subject,
        form.message,
        submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
