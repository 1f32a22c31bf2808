use crate::config::{MailConfig, WhatsAppConfig};
use crate::database::SettingsRepository;
use crate::models::{NotificationSettings, SmtpSettings, WhatsAppSettings};
use std::collections::HashMap;
use std::sync::Arc;

const SMTP_KEYS: [&str; 6] = [
    "smtp_host",
    "smtp_port",
    "smtp_user",
    "smtp_pass",
    "smtp_from_email",
    "smtp_from_name",
];

const NOTIFICATION_KEYS: [&str; 3] = [
    "notifications_order_emails",
    "notifications_contact_emails",
    "notifications_order_whatsapp_numbers",
];

const WHATSAPP_KEYS: [&str; 3] = [
    "whatsapp_access_token",
    "whatsapp_phone_number_id",
    "whatsapp_business_account_id",
];

/// 请求时读取 system_settings，缺失或为空的键回落到配置文件 / 环境变量
#[derive(Clone)]
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
    mail_defaults: MailConfig,
    whatsapp_defaults: WhatsAppConfig,
}

impl SettingsService {
    pub fn new(
        repository: Arc<dyn SettingsRepository>,
        mail_defaults: MailConfig,
        whatsapp_defaults: WhatsAppConfig,
    ) -> Self {
        Self {
            repository,
            mail_defaults,
            whatsapp_defaults,
        }
    }

    /// 读不到配置表时只记录警告，全部使用默认值
    async fn load(&self, keys: &[&str]) -> HashMap<String, String> {
        match self.repository.find_values(keys).await {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Failed to read system settings {keys:?}, using defaults: {e}");
                HashMap::new()
            }
        }
    }

    pub async fn smtp_settings(&self) -> SmtpSettings {
        let values = self.load(&SMTP_KEYS).await;
        let d = &self.mail_defaults;

        let port = values
            .get("smtp_port")
            .and_then(|p| p.trim().parse::<u16>().ok())
            .unwrap_or(d.smtp_port);

        SmtpSettings {
            host: pick(&values, "smtp_host", &d.smtp_host),
            port,
            user: pick(&values, "smtp_user", &d.smtp_user),
            password: pick(&values, "smtp_pass", &d.smtp_password),
            from_email: pick(&values, "smtp_from_email", &d.from_email),
            from_name: pick(&values, "smtp_from_name", &d.from_name),
        }
    }

    pub async fn notification_settings(&self) -> NotificationSettings {
        let values = self.load(&NOTIFICATION_KEYS).await;
        let d = &self.mail_defaults;

        NotificationSettings {
            order_emails: pick_list(&values, "notifications_order_emails", &[d.admin_email.as_str()]),
            contact_emails: pick_list(
                &values,
                "notifications_contact_emails",
                &[d.contact_email.as_str()],
            ),
            order_whatsapp_numbers: pick_list(
                &values,
                "notifications_order_whatsapp_numbers",
                &[],
            ),
        }
    }

    pub async fn whatsapp_settings(&self) -> WhatsAppSettings {
        let values = self.load(&WHATSAPP_KEYS).await;
        let d = &self.whatsapp_defaults;

        let business_account_id = pick(
            &values,
            "whatsapp_business_account_id",
            &d.business_account_id,
        );
        WhatsAppSettings {
            access_token: pick(&values, "whatsapp_access_token", &d.access_token),
            phone_number_id: pick(&values, "whatsapp_phone_number_id", &d.phone_number_id),
            business_account_id: (!business_account_id.is_empty()).then_some(business_account_id),
        }
    }
}

fn pick(values: &HashMap<String, String>, key: &str, default: &str) -> String {
    values
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn pick_list(values: &HashMap<String, String>, key: &str, default: &[&str]) -> Vec<String> {
    let parsed = values.get(key).map(|v| parse_list(v)).unwrap_or_default();
    if parsed.is_empty() {
        parse_list(&default.join(","))
    } else {
        parsed
    }
}

/// 逗号分隔列表：去空白、去空项、保序去重
pub fn parse_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|e| e == entry) {
            out.push(entry.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::settings_repository::fake::InMemorySettingsRepository;

    fn service(repo: InMemorySettingsRepository) -> SettingsService {
        let mail = MailConfig {
            smtp_host: "smtp.env.example".to_string(),
            smtp_user: "env-user".to_string(),
            smtp_password: "env-pass".to_string(),
            ..MailConfig::default()
        };
        SettingsService::new(Arc::new(repo), mail, WhatsAppConfig::default())
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" a@x.com, ,b@x.com,a@x.com ,, c@x.com"),
            vec!["a@x.com", "b@x.com", "c@x.com"]
        );
        assert!(parse_list(" , ").is_empty());
    }

    #[actix_web::test]
    async fn test_smtp_settings_prefer_database_values() {
        let repo = InMemorySettingsRepository::default()
            .with("smtp_host", "smtp.db.example")
            .with("smtp_port", "465")
            .with("smtp_from_name", "  ");
        let smtp = service(repo).smtp_settings().await;
        assert_eq!(smtp.host, "smtp.db.example");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.user, "env-user");
        // 空白值回落默认
        assert_eq!(smtp.from_name, "Astra");
        assert!(smtp.is_complete());
    }

    #[actix_web::test]
    async fn test_smtp_port_falls_back_on_garbage() {
        let repo = InMemorySettingsRepository::default().with("smtp_port", "five-eight-seven");
        assert_eq!(service(repo).smtp_settings().await.port, 587);
    }

    #[actix_web::test]
    async fn test_notification_lists_fall_back_to_defaults() {
        let repo = InMemorySettingsRepository::default()
            .with("notifications_order_emails", " , ")
            .with(
                "notifications_order_whatsapp_numbers",
                "+923001112222, +923003334444, +923001112222",
            );
        let settings = service(repo).notification_settings().await;
        assert_eq!(settings.order_emails, vec!["admin@3starfoods.com"]);
        assert_eq!(settings.contact_emails, vec!["info@3starfoods.com"]);
        assert_eq!(
            settings.order_whatsapp_numbers,
            vec!["+923001112222", "+923003334444"]
        );
    }

    #[actix_web::test]
    async fn test_database_unavailable_uses_defaults() {
        let repo = InMemorySettingsRepository {
            unavailable: true,
            ..Default::default()
        };
        let service = service(repo);
        let smtp = service.smtp_settings().await;
        assert_eq!(smtp.host, "smtp.env.example");
        assert_eq!(smtp.port, 587);

        let notifications = service.notification_settings().await;
        assert!(notifications.order_whatsapp_numbers.is_empty());

        let whatsapp = service.whatsapp_settings().await;
        assert!(!whatsapp.is_complete());
        assert_eq!(whatsapp.business_account_id, None);
    }
}
