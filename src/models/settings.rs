/// SMTP 发信配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl SmtpSettings {
    /// host / user / password 任一为空都无法发信
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty() && !self.user.is_empty() && !self.password.is_empty()
    }
}

/// 通知收件人
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub order_emails: Vec<String>,
    pub contact_emails: Vec<String>,
    pub order_whatsapp_numbers: Vec<String>,
}

/// WhatsApp Business Cloud API 凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppSettings {
    pub access_token: String,
    pub phone_number_id: String,
    pub business_account_id: Option<String>,
}

impl WhatsAppSettings {
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.phone_number_id.is_empty()
    }
}
