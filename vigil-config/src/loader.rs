use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;
use url::Url;
use vigil_core::{
    domain::inactivity::BlackoutPeriod,
    infrastructure::mail::{
        DEFAULT_SENDGRID_API_URL, SendGridSettings, TierTemplates,
    },
};

use super::{
    models::{
        Config, ConfigMetadata, DEFAULT_DATABASE_MAX_CONNECTIONS,
        DatabaseConfig, MailBackend, MailConfig,
    },
    sources::{EnvConfig, FileBlackoutConfig, FileConfig, FileMailConfig},
    validation::ConfigWarnings,
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![PathBuf::from("vigil.toml"), PathBuf::from("config/vigil.toml")]
});

#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
                default_blackout: false,
            },
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        // A path named by --config or VIGIL_CONFIG must exist; the default
        // locations are only probed.
        let requested = self
            .config_path
            .as_ref()
            .or(env_config.config_path.as_ref())
            .cloned();

        let path = match requested {
            Some(path) if path.exists() => path,
            Some(path) => return Err(ConfigLoadError::MissingConfig { path }),
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => path.clone(),
                None => return Ok((None, None)),
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    mut metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No vigil.toml detected; falling back to environment variables",
            "Set VIGIL_CONFIG or pass --config to point at a configuration file",
        );
    }

    let FileConfig {
        database: file_database,
        mail: file_mail,
        blackout: file_blackout,
    } = file_config.unwrap_or_default();

    let raw_url = env
        .database_url
        .clone()
        .or(file_database.url)
        .ok_or(ConfigLoadError::MissingDatabaseUrl)?;
    let parsed = Url::parse(raw_url.trim())
        .map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    if !matches!(parsed.scheme(), "postgres" | "postgresql") {
        return Err(ConfigLoadError::UnsupportedDatabaseScheme {
            scheme: parsed.scheme().to_string(),
        });
    }
    let database = DatabaseConfig {
        url: raw_url.trim().to_string(),
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
    };

    let mail = resolve_mail(&env, file_mail, &mut warnings)?;

    let blackout = match resolve_blackout(&env, &file_blackout)? {
        Some(period) => period,
        None => {
            metadata.default_blackout = true;
            BlackoutPeriod::default()
        }
    };

    Ok((
        Config {
            database,
            mail,
            blackout,
            metadata,
        },
        warnings,
    ))
}

fn resolve_mail(
    env: &EnvConfig,
    file_mail: FileMailConfig,
    warnings: &mut ConfigWarnings,
) -> Result<MailConfig, ConfigLoadError> {
    let backend = match env.mail_backend.clone().or(file_mail.backend) {
        Some(raw) => raw
            .parse::<MailBackend>()
            .map_err(|value| ConfigLoadError::InvalidMailBackend { value })?,
        None => {
            warnings.push_with_hint(
                "MAIL_BACKEND not set; inactivity notices will only be logged",
                "Set MAIL_BACKEND=sendgrid with SendGrid credentials to deliver email",
            );
            MailBackend::Log
        }
    };

    if backend == MailBackend::Log {
        return Ok(MailConfig::Log);
    }

    let sendgrid = file_mail.sendgrid;
    let required = |value: Option<String>, key: &'static str| {
        value.ok_or(ConfigLoadError::MissingMailSetting { key })
    };

    let api_key = required(
        env.sendgrid_api_key.clone().or(sendgrid.api_key),
        "SENDGRID_API_KEY",
    )?;
    let sender_email = required(
        env.mail_sender_email.clone().or(file_mail.sender_email),
        "MAIL_SENDER_EMAIL",
    )?;
    let templates = TierTemplates {
        thirty_days: required(
            env.template_thirty_days
                .clone()
                .or(sendgrid.templates.thirty_days),
            "SENDGRID_TEMPLATE_INACTIVE_THIRTY_DAYS",
        )?,
        sixty_days: required(
            env.template_sixty_days
                .clone()
                .or(sendgrid.templates.sixty_days),
            "SENDGRID_TEMPLATE_INACTIVE_SIXTY_DAYS",
        )?,
        ninety_days: required(
            env.template_ninety_days
                .clone()
                .or(sendgrid.templates.ninety_days),
            "SENDGRID_TEMPLATE_INACTIVE_NINETY_DAYS",
        )?,
    };

    let api_url = env
        .sendgrid_api_url
        .clone()
        .or(sendgrid.api_url)
        .unwrap_or_else(|| DEFAULT_SENDGRID_API_URL.to_string());
    let api_url = Url::parse(&api_url)
        .map_err(|source| ConfigLoadError::InvalidSendGridUrl { source })?;

    let unsubscribe_group_id = env
        .sendgrid_unsubscribe_group_id
        .or(sendgrid.unsubscribe_group_id);
    if unsubscribe_group_id.is_none() {
        warnings.push(
            "SENDGRID_UNSUBSCRIBE_GROUP_ID not set; notices go out without an unsubscribe group",
        );
    }

    Ok(MailConfig::SendGrid(SendGridSettings {
        api_key,
        api_url,
        sender_email,
        sender_name: env.mail_sender_name.clone().or(file_mail.sender_name),
        unsubscribe_group_id,
        templates,
    }))
}

fn resolve_blackout(
    env: &EnvConfig,
    file_blackout: &FileBlackoutConfig,
) -> Result<Option<BlackoutPeriod>, ConfigLoadError> {
    let start = env
        .blackout_start
        .as_deref()
        .map(|raw| ("BLACKOUT_PERIOD_START", raw))
        .or_else(|| {
            file_blackout
                .start
                .as_deref()
                .map(|raw| ("blackout.start", raw))
        });
    let end = env
        .blackout_end
        .as_deref()
        .map(|raw| ("BLACKOUT_PERIOD_END", raw))
        .or_else(|| {
            file_blackout.end.as_deref().map(|raw| ("blackout.end", raw))
        });

    match (start, end) {
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => {
            Err(ConfigLoadError::IncompleteBlackout)
        }
        (Some((start_key, start)), Some((end_key, end))) => {
            let start = parse_instant(start_key, start)?;
            let end = parse_instant(end_key, end)?;
            if end < start {
                return Err(ConfigLoadError::BlackoutOutOfOrder { start, end });
            }
            Ok(Some(BlackoutPeriod::new(start, end)))
        }
    }
}

fn parse_instant(
    key: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, ConfigLoadError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|source| ConfigLoadError::InvalidInstant {
            key,
            value: raw.to_string(),
            source,
        })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DATABASE_URL is not set and the config file has no database.url")]
    MissingDatabaseUrl,
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}'; expected postgres")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("unknown mail backend '{value}'; expected 'sendgrid' or 'log'")]
    InvalidMailBackend { value: String },
    #[error("{key} is required when MAIL_BACKEND is 'sendgrid'")]
    MissingMailSetting { key: &'static str },
    #[error("invalid SendGrid API URL")]
    InvalidSendGridUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("blackout period needs both a start and an end")]
    IncompleteBlackout,
    #[error("{key} is not an RFC 3339 instant: '{value}'")]
    InvalidInstant {
        key: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("blackout period ends ({end}) before it starts ({start})")]
    BlackoutOutOfOrder {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
