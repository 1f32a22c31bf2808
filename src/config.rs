use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 邮件模板中使用的站点信息；base_url 同时是 CORS 唯一允许的来源
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub company_address: String,
    pub company_phone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            company_address: String::new(),
            company_phone: String::new(),
        }
    }
}

/// SMTP 与通知收件人的默认值；system_settings 表中的同名配置优先
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub admin_email: String,
    pub contact_email: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@3starfoods.com".to_string(),
            from_name: "Astra".to_string(),
            admin_email: "admin@3starfoods.com".to_string(),
            contact_email: "info@3starfoods.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub access_token: String,
    pub phone_number_id: String,
    pub business_account_id: String,
    pub graph_base_url: String,
    pub api_version: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            business_account_id: String::new(),
            graph_base_url: "https://graph.facebook.com".to_string(),
            api_version: "v18.0".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    "DATABASE_URL is not set and no config.toml was found".to_string()
                })?;

                Config {
                    server: ServerConfig {
                        host: "0.0.0.0".to_string(),
                        port: 8080,
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: 10,
                    },
                    site: SiteConfig::default(),
                    mail: MailConfig::default(),
                    whatsapp: WhatsAppConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    fn apply_env<F>(&mut self, get_env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn set_string(target: &mut String, value: Option<String>) {
            if let Some(v) = value {
                *target = v;
            }
        }
        fn set_parsed<T: std::str::FromStr>(target: &mut T, value: Option<String>) {
            if let Some(v) = value.and_then(|v| v.parse().ok()) {
                *target = v;
            }
        }

        set_string(&mut self.server.host, get_env("SERVER_HOST"));
        set_parsed(&mut self.server.port, get_env("SERVER_PORT"));
        set_string(&mut self.database.url, get_env("DATABASE_URL"));
        set_parsed(
            &mut self.database.max_connections,
            get_env("DB_MAX_CONNECTIONS"),
        );

        set_string(
            &mut self.site.base_url,
            get_env("SITE_URL").or_else(|| get_env("NEXTAUTH_URL")),
        );
        set_string(&mut self.site.company_address, get_env("COMPANY_ADDRESS"));
        set_string(&mut self.site.company_phone, get_env("COMPANY_PHONE"));

        set_string(&mut self.mail.smtp_host, get_env("SMTP_HOST"));
        set_parsed(&mut self.mail.smtp_port, get_env("SMTP_PORT"));
        set_string(&mut self.mail.smtp_user, get_env("SMTP_USER"));
        set_string(&mut self.mail.smtp_password, get_env("SMTP_PASS"));
        set_string(
            &mut self.mail.from_email,
            get_env("MAIL_FROM_EMAIL").or_else(|| get_env("EMAIL_FROM")),
        );
        set_string(&mut self.mail.from_name, get_env("MAIL_FROM_NAME"));
        let admin_email = get_env("ADMIN_EMAIL");
        set_string(
            &mut self.mail.contact_email,
            get_env("CONTACT_FORM_EMAIL").or_else(|| admin_email.clone()),
        );
        set_string(&mut self.mail.admin_email, admin_email);

        set_string(
            &mut self.whatsapp.access_token,
            get_env("WHATSAPP_ACCESS_TOKEN"),
        );
        set_string(
            &mut self.whatsapp.phone_number_id,
            get_env("WHATSAPP_PHONE_NUMBER_ID"),
        );
        set_string(
            &mut self.whatsapp.business_account_id,
            get_env("WHATSAPP_BUSINESS_ACCOUNT_ID"),
        );
        set_string(
            &mut self.whatsapp.graph_base_url,
            get_env("WHATSAPP_GRAPH_BASE_URL"),
        );
        set_string(&mut self.whatsapp.api_version, get_env("WHATSAPP_API_VERSION"));
    }
}
