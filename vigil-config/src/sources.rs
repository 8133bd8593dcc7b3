use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub mail: FileMailConfig,
    #[serde(default)]
    pub blackout: FileBlackoutConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMailConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sendgrid: FileSendGridConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSendGridConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribe_group_id: Option<u32>,
    #[serde(default)]
    pub templates: FileTemplateConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTemplateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thirty_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sixty_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ninety_days: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileBlackoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub mail_backend: Option<String>,
    pub mail_sender_email: Option<String>,
    pub mail_sender_name: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_api_url: Option<String>,
    pub sendgrid_unsubscribe_group_id: Option<u32>,
    pub template_thirty_days: Option<String>,
    pub template_sixty_days: Option<String>,
    pub template_ninety_days: Option<String>,
    pub blackout_start: Option<String>,
    pub blackout_end: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("VIGIL_CONFIG").map(PathBuf::from),
            database_url: non_empty_var("DATABASE_URL"),
            database_max_connections: non_empty_var("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok()),
            mail_backend: non_empty_var("MAIL_BACKEND"),
            mail_sender_email: non_empty_var("MAIL_SENDER_EMAIL"),
            mail_sender_name: non_empty_var("MAIL_SENDER_NAME"),
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
            sendgrid_api_url: non_empty_var("SENDGRID_API_URL"),
            sendgrid_unsubscribe_group_id: non_empty_var(
                "SENDGRID_UNSUBSCRIBE_GROUP_ID",
            )
            .and_then(|s| s.parse().ok()),
            template_thirty_days: non_empty_var(
                "SENDGRID_TEMPLATE_INACTIVE_THIRTY_DAYS",
            ),
            template_sixty_days: non_empty_var(
                "SENDGRID_TEMPLATE_INACTIVE_SIXTY_DAYS",
            ),
            template_ninety_days: non_empty_var(
                "SENDGRID_TEMPLATE_INACTIVE_NINETY_DAYS",
            ),
            blackout_start: non_empty_var("BLACKOUT_PERIOD_START"),
            blackout_end: non_empty_var("BLACKOUT_PERIOD_END"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Every variable [`EnvConfig::gather`] reads.
pub const ENV_KEYS: &[&str] = &[
    "VIGIL_CONFIG",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "MAIL_BACKEND",
    "MAIL_SENDER_EMAIL",
    "MAIL_SENDER_NAME",
    "SENDGRID_API_KEY",
    "SENDGRID_API_URL",
    "SENDGRID_UNSUBSCRIBE_GROUP_ID",
    "SENDGRID_TEMPLATE_INACTIVE_THIRTY_DAYS",
    "SENDGRID_TEMPLATE_INACTIVE_SIXTY_DAYS",
    "SENDGRID_TEMPLATE_INACTIVE_NINETY_DAYS",
    "BLACKOUT_PERIOD_START",
    "BLACKOUT_PERIOD_END",
];
