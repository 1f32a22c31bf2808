use crate::error::{AppError, AppResult};
use crate::models::SmtpSettings;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// 待发送的邮件（HTML + 纯文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// 邮件发送能力；SMTP 配置在请求时读取，所以随每次发送传入
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, smtp: &SmtpSettings, email: &OutgoingEmail) -> AppResult<()>;
}

/// 465 直接 TLS，587 强制 STARTTLS，其它端口尽量升级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    Wrapper,
    Required,
    Opportunistic,
}

impl TlsMode {
    pub fn for_port(port: u16) -> Self {
        match port {
            465 => TlsMode::Wrapper,
            587 => TlsMode::Required,
            _ => TlsMode::Opportunistic,
        }
    }
}

#[derive(Clone, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    pub fn new() -> Self {
        Self
    }

    fn build_transport(smtp: &SmtpSettings) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let params = TlsParameters::new(smtp.host.clone())
            .map_err(|e| AppError::MailError(format!("Invalid TLS parameters: {e}")))?;
        let tls = match TlsMode::for_port(smtp.port) {
            TlsMode::Wrapper => Tls::Wrapper(params),
            TlsMode::Required => Tls::Required(params),
            TlsMode::Opportunistic => Tls::Opportunistic(params),
        };

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host.as_str())
                .port(smtp.port)
                .tls(tls)
                .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
                .build(),
        )
    }

    pub fn build_message(smtp: &SmtpSettings, email: &OutgoingEmail) -> AppResult<Message> {
        if email.to.is_empty() {
            return Err(AppError::MailError("No recipients".to_string()));
        }

        let from = Mailbox::new(Some(smtp.from_name.clone()), parse_address(&smtp.from_email)?);
        let mut builder = Message::builder().from(from).subject(email.subject.as_str());
        for recipient in &email.to {
            builder = builder.to(Mailbox::new(None, parse_address(recipient)?));
        }
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to)?));
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| AppError::MailError(format!("Failed to build message: {e}")))
    }
}

fn parse_address(raw: &str) -> AppResult<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| AppError::MailError(format!("Invalid email address {raw}: {e}")))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, smtp: &SmtpSettings, email: &OutgoingEmail) -> AppResult<()> {
        let message = Self::build_message(smtp, email)?;
        let transport = Self::build_transport(smtp)?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::MailError(format!("SMTP send failed: {e}")))?;

        log::info!(
            "Email sent: \"{}\" to {} recipient(s)",
            email.subject,
            email.to.len()
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn smtp() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: "orders@example.com".to_string(),
            password: "secret".to_string(),
            from_email: "orders@example.com".to_string(),
            from_name: "Astra".to_string(),
        }
    }

    fn email(to: Vec<&str>) -> OutgoingEmail {
        OutgoingEmail {
            to: to.into_iter().map(String::from).collect(),
            reply_to: Some("customer@example.com".to_string()),
            subject: "New Order #TSF-123456 - Ayesha".to_string(),
            text: "New Order".to_string(),
            html: "<p>New Order</p>".to_string(),
        }
    }

    #[test]
    fn test_tls_mode_for_port() {
        assert_eq!(TlsMode::for_port(465), TlsMode::Wrapper);
        assert_eq!(TlsMode::for_port(587), TlsMode::Required);
        assert_eq!(TlsMode::for_port(25), TlsMode::Opportunistic);
    }

    #[test]
    fn test_build_message_with_multiple_recipients() {
        let message =
            SmtpMailer::build_message(&smtp(), &email(vec!["a@example.com", "b@example.com"]))
                .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("Reply-To: customer@example.com"));
        assert!(raw.contains("Subject: New Order #TSF-123456 - Ayesha"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let err = SmtpMailer::build_message(&smtp(), &email(vec!["not-an-address"])).unwrap_err();
        assert!(matches!(err, AppError::MailError(_)));
    }

    #[test]
    fn test_build_message_requires_recipient() {
        let err = SmtpMailer::build_message(&smtp(), &email(vec![])).unwrap_err();
        assert!(matches!(err, AppError::MailError(_)));
    }
}
