pub mod mailer;
pub mod whatsapp;

pub use mailer::{Mailer, OutgoingEmail, SmtpMailer, TlsMode};
pub use whatsapp::{WhatsAppCloudApi, WhatsAppSender};
