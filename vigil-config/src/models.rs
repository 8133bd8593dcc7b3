use std::{fmt, path::PathBuf, str::FromStr};

use vigil_core::{
    domain::inactivity::BlackoutPeriod, infrastructure::mail::SendGridSettings,
};

pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub blackout: BlackoutPeriod,
    pub metadata: ConfigMetadata,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &redact_password(&self.url))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn redact_password(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable>".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailBackend {
    SendGrid,
    #[default]
    Log,
}

impl MailBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            MailBackend::SendGrid => "sendgrid",
            MailBackend::Log => "log",
        }
    }
}

impl fmt::Display for MailBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MailBackend {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sendgrid" => Ok(MailBackend::SendGrid),
            "log" => Ok(MailBackend::Log),
            other => Err(other.to_string()),
        }
    }
}

/// Resolved mail transport.
#[derive(Debug, Clone)]
pub enum MailConfig {
    SendGrid(SendGridSettings),
    Log,
}

impl MailConfig {
    pub fn backend(&self) -> MailBackend {
        match self {
            MailConfig::SendGrid(_) => MailBackend::SendGrid,
            MailConfig::Log => MailBackend::Log,
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    pub default_blackout: bool,
}
