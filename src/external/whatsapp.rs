use crate::config::WhatsAppConfig;
use crate::error::{AppError, AppResult};
use crate::models::WhatsAppSettings;
use crate::utils::normalize_whatsapp_number;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// WhatsApp 消息发送能力
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    async fn send_text(
        &self,
        credentials: &WhatsAppSettings,
        to: &str,
        body: &str,
    ) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
pub struct SendTextRequest<'a> {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct TextBody<'a> {
    pub preview_url: bool,
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct MessageId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// WhatsApp Business Cloud API 客户端
#[derive(Clone)]
pub struct WhatsAppCloudApi {
    client: Client,
    base_url: String,
    api_version: String,
}

impl WhatsAppCloudApi {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    fn messages_url(&self, phone_number_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.api_version, phone_number_id
        )
    }
}

#[async_trait]
impl WhatsAppSender for WhatsAppCloudApi {
    async fn send_text(
        &self,
        credentials: &WhatsAppSettings,
        to: &str,
        body: &str,
    ) -> AppResult<()> {
        let recipient = normalize_whatsapp_number(to);
        if recipient.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Invalid WhatsApp number: {to}"
            )));
        }

        let request = SendTextRequest {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: recipient,
            message_type: "text",
            text: TextBody {
                preview_url: false,
                body,
            },
        };

        let response = self
            .client
            .post(self.messages_url(&credentials.phone_number_id))
            .bearer_auth(&credentials.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let sent: SendMessageResponse = response.json().await?;
            log::debug!(
                "WhatsApp message accepted for {}: {:?}",
                to,
                sent.messages.first().map(|m| m.id.as_str())
            );
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let detail = serde_json::from_str::<GraphErrorResponse>(&error_text)
                .map(|e| match e.error.code {
                    Some(code) => format!("{} (code {code})", e.error.message),
                    None => e.error.message,
                })
                .unwrap_or(error_text);
            Err(AppError::ExternalApiError(format!(
                "WhatsApp send failed: HTTP {}: {}",
                status.as_u16(),
                detail
            )))
        }
    }
}
