use crate::config::SiteConfig;
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutgoingEmail};
use crate::models::{ContactFormRequest, ContactSubmission};
use crate::services::SettingsService;
use crate::utils::email_template::{render_contact_html, render_contact_text};
use crate::utils::{Branding, is_valid_email};
use chrono::Utc;
use std::sync::Arc;

/// 网站联系表单：校验后发邮件给联系人列表
#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    settings: SettingsService,
    site: SiteConfig,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, settings: SettingsService, site: SiteConfig) -> Self {
        Self {
            mailer,
            settings,
            site,
        }
    }

    pub async fn submit(&self, request: ContactFormRequest) -> AppResult<()> {
        let form = validate(request)?;

        let smtp = self.settings.smtp_settings().await;
        if !smtp.is_complete() {
            log::warn!("SMTP settings incomplete, cannot deliver contact form from {}", form.email);
            return Err(AppError::ConfigError(
                "Email service not configured. Please contact support directly.".to_string(),
            ));
        }
        let recipients = self.settings.notification_settings().await.contact_emails;

        let branding = Branding {
            base_url: self.site.base_url.clone(),
            company_name: smtp.from_name.clone(),
            company_email: smtp.from_email.clone(),
            company_address: self.site.company_address.clone(),
            company_phone: self.site.company_phone.clone(),
        };
        let now = Utc::now();
        let email = OutgoingEmail {
            to: recipients,
            reply_to: Some(form.email.clone()),
            subject: format!("Contact Form: {}", form.subject),
            text: render_contact_text(&form, now),
            html: render_contact_html(&form, &branding, now),
        };

        if let Err(e) = self.mailer.send(&smtp, &email).await {
            log::error!("Failed to send contact form email: {e}");
            return Err(e);
        }

        log::info!("Contact form from {} delivered", form.email);
        Ok(())
    }
}

/// 前端直接展示这些文案
fn check_length(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len == 0 {
        errors.push(format!("{field} is required"));
    } else if len < min {
        errors.push(format!("{field} must be at least {min} characters long"));
    } else if len > max {
        errors.push(format!("{field} must be less than {max} characters"));
    }
}

/// 收集全部字段错误后一起返回
pub fn validate(request: ContactFormRequest) -> AppResult<ContactSubmission> {
    let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
    let name = trimmed(request.name);
    let email = trimmed(request.email).to_lowercase();
    let subject = trimmed(request.subject);
    let message = trimmed(request.message);

    let mut errors = Vec::new();
    check_length(&mut errors, "Name", &name, 2, 100);
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(&email) {
        errors.push("Please enter a valid email address".to_string());
    }
    check_length(&mut errors, "Subject", &subject, 3, 200);
    check_length(&mut errors, "Message", &message, 10, 5000);

    if !errors.is_empty() {
        return Err(AppError::InvalidForm(errors));
    }
    Ok(ContactSubmission {
        name,
        email,
        subject,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MailConfig, WhatsAppConfig};
    use crate::database::settings_repository::fake::InMemorySettingsRepository;
    use crate::external::mailer::fake::RecordingMailer;

    fn form() -> ContactFormRequest {
        ContactFormRequest {
            name: Some("  Sara Ahmed ".to_string()),
            email: Some("Sara@Example.COM".to_string()),
            subject: Some("Gemstone sizing".to_string()),
            message: Some("Which ring sizes do you stock?".to_string()),
        }
    }

    fn service(settings: InMemorySettingsRepository, mailer: Arc<RecordingMailer>) -> ContactService {
        let settings = SettingsService::new(
            Arc::new(settings),
            MailConfig::default(),
            WhatsAppConfig::default(),
        );
        ContactService::new(mailer, settings, SiteConfig::default())
    }

    fn smtp_settings() -> InMemorySettingsRepository {
        InMemorySettingsRepository::default()
            .with("smtp_host", "smtp.example.com")
            .with("smtp_user", "site@example.com")
            .with("smtp_pass", "secret")
            .with("notifications_contact_emails", "support@example.com")
    }

    #[test]
    fn test_validate_trims_and_lowercases() {
        let form = validate(form()).unwrap();
        assert_eq!(form.name, "Sara Ahmed");
        assert_eq!(form.email, "sara@example.com");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let err = validate(ContactFormRequest {
            name: Some("S".to_string()),
            email: Some("not-an-email".to_string()),
            subject: Some("  ".to_string()),
            message: Some("too short".to_string()),
        })
        .unwrap_err();

        let AppError::InvalidForm(errors) = err else {
            panic!("expected InvalidForm");
        };
        assert_eq!(
            errors,
            vec![
                "Name must be at least 2 characters long",
                "Please enter a valid email address",
                "Subject is required",
                "Message must be at least 10 characters long",
            ]
        );
    }

    #[test]
    fn test_validate_upper_bounds() {
        let mut req = form();
        req.subject = Some("x".repeat(201));
        req.message = Some("y".repeat(5001));
        let Err(AppError::InvalidForm(errors)) = validate(req) else {
            panic!("expected InvalidForm");
        };
        assert_eq!(
            errors,
            vec![
                "Subject must be less than 200 characters",
                "Message must be less than 5000 characters",
            ]
        );
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        let mut req = form();
        req.name = Some("عل".to_string());
        assert!(validate(req).is_ok());
    }

    #[actix_web::test]
    async fn test_submit_sends_with_reply_to() {
        let mailer = Arc::new(RecordingMailer::default());
        service(smtp_settings(), mailer.clone())
            .submit(form())
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["support@example.com"]);
        assert_eq!(sent[0].reply_to.as_deref(), Some("sara@example.com"));
        assert_eq!(sent[0].subject, "Contact Form: Gemstone sizing");
    }

    #[actix_web::test]
    async fn test_submit_without_smtp_is_config_error() {
        let mailer = Arc::new(RecordingMailer::default());
        let err = service(InMemorySettingsRepository::default(), mailer.clone())
            .submit(form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ConfigError(_)));
        assert_eq!(*mailer.attempts.lock().unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_submit_send_failure_is_mail_error() {
        let mailer = Arc::new(RecordingMailer {
            unreachable: true,
            ..Default::default()
        });
        let err = service(smtp_settings(), mailer).submit(form()).await.unwrap_err();
        assert!(matches!(err, AppError::MailError(_)));
    }
}
