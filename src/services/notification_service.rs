use crate::config::SiteConfig;
use crate::external::{Mailer, OutgoingEmail, WhatsAppSender};
use crate::models::{OrderIntake, SmtpSettings};
use crate::services::SettingsService;
use crate::utils::email_template::{render_order_html, render_order_text};
use crate::utils::{Audience, Branding, format_order_message};
use futures_util::future::join_all;
use std::sync::Arc;

/// 单个通知的投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed(String),
    Skipped,
}

/// 一次下单的全部通知结果；只用于日志与测试，不影响接口响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport {
    pub admin_email: Delivery,
    pub customer_email: Delivery,
    pub whatsapp: Vec<(String, Delivery)>,
}

/// 订单保存后的邮件与 WhatsApp 通知；每个渠道、每个收件人互不影响
#[derive(Clone)]
pub struct OrderNotifier {
    mailer: Arc<dyn Mailer>,
    whatsapp: Arc<dyn WhatsAppSender>,
    settings: SettingsService,
    site: SiteConfig,
}

impl OrderNotifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        whatsapp: Arc<dyn WhatsAppSender>,
        settings: SettingsService,
        site: SiteConfig,
    ) -> Self {
        Self {
            mailer,
            whatsapp,
            settings,
            site,
        }
    }

    pub async fn notify_order(&self, order_number: &str, order: &OrderIntake) -> NotificationReport {
        let notifications = self.settings.notification_settings().await;
        let smtp = self.settings.smtp_settings().await;

        let (admin_email, customer_email) = if smtp.is_complete() {
            self.send_order_emails(&smtp, &notifications.order_emails, order_number, order)
                .await
        } else {
            log::warn!("SMTP settings incomplete, skipping order emails for {order_number}");
            (Delivery::Skipped, Delivery::Skipped)
        };

        let whatsapp = self
            .send_whatsapp(&notifications.order_whatsapp_numbers, order_number, order)
            .await;

        NotificationReport {
            admin_email,
            customer_email,
            whatsapp,
        }
    }

    async fn send_order_emails(
        &self,
        smtp: &SmtpSettings,
        admin_recipients: &[String],
        order_number: &str,
        order: &OrderIntake,
    ) -> (Delivery, Delivery) {
        let branding = Branding {
            base_url: self.site.base_url.clone(),
            company_name: smtp.from_name.clone(),
            company_email: smtp.from_email.clone(),
            company_address: self.site.company_address.clone(),
            company_phone: self.site.company_phone.clone(),
        };
        let text = render_order_text(order_number, order);
        let name = &order.customer.name;

        let admin = OutgoingEmail {
            to: admin_recipients.to_vec(),
            reply_to: None,
            subject: format!("New Order #{order_number} - {name}"),
            text: text.clone(),
            html: render_order_html(order_number, order, &branding, Audience::Admin),
        };
        let admin_result = self.deliver_email(smtp, &admin, "admin").await;

        let customer = OutgoingEmail {
            to: vec![order.customer.email.clone()],
            reply_to: None,
            subject: format!("Order Confirmation #{order_number} - {name}"),
            text,
            html: render_order_html(order_number, order, &branding, Audience::Customer),
        };
        let customer_result = self.deliver_email(smtp, &customer, "customer").await;

        (admin_result, customer_result)
    }

    async fn deliver_email(
        &self,
        smtp: &SmtpSettings,
        email: &OutgoingEmail,
        audience: &str,
    ) -> Delivery {
        match self.mailer.send(smtp, email).await {
            Ok(()) => {
                log::info!("Sent {audience} email \"{}\"", email.subject);
                Delivery::Sent
            }
            Err(e) => {
                log::error!("Failed to send {audience} email \"{}\": {e}", email.subject);
                Delivery::Failed(e.to_string())
            }
        }
    }

    async fn send_whatsapp(
        &self,
        numbers: &[String],
        order_number: &str,
        order: &OrderIntake,
    ) -> Vec<(String, Delivery)> {
        if numbers.is_empty() {
            return Vec::new();
        }

        let credentials = self.settings.whatsapp_settings().await;
        if !credentials.is_complete() {
            log::warn!("WhatsApp settings incomplete, skipping WhatsApp notifications");
            return numbers
                .iter()
                .map(|n| (n.clone(), Delivery::Skipped))
                .collect();
        }

        let message = format_order_message(order_number, order);
        let sends = numbers.iter().map(|number| {
            let credentials = &credentials;
            let message = message.as_str();
            async move {
                let delivery = match self.whatsapp.send_text(credentials, number, message).await {
                    Ok(()) => {
                        log::info!("WhatsApp notification for {order_number} sent to {number}");
                        Delivery::Sent
                    }
                    Err(e) => {
                        log::error!("Failed to send WhatsApp notification to {number}: {e}");
                        Delivery::Failed(e.to_string())
                    }
                };
                (number.clone(), delivery)
            }
        });

        join_all(sends).await
    }
}
