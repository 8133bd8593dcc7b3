use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::domain::inactivity::{InactivityContact, InactivityTier};
use crate::error::{Result, VigilError};
use crate::mail::InactivityMailer;

pub const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";
const MAIL_SEND_PATH: &str = "v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Dynamic template ids, one per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTemplates {
    pub thirty_days: String,
    pub sixty_days: String,
    pub ninety_days: String,
}

impl TierTemplates {
    pub fn for_tier(&self, tier: InactivityTier) -> &str {
        match tier {
            InactivityTier::ThirtyDays => &self.thirty_days,
            InactivityTier::SixtyDays => &self.sixty_days,
            InactivityTier::NinetyDays => &self.ninety_days,
        }
    }
}

#[derive(Clone)]
pub struct SendGridSettings {
    pub api_key: String,
    pub api_url: Url,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub unsubscribe_group_id: Option<u32>,
    pub templates: TierTemplates,
}

impl fmt::Debug for SendGridSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridSettings")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("unsubscribe_group_id", &self.unsubscribe_group_id)
            .field("templates", &self.templates)
            .finish()
    }
}

/// Delivers inactivity notices through SendGrid dynamic templates.
#[derive(Debug, Clone)]
pub struct SendGridMailer {
    settings: SendGridSettings,
    endpoint: Url,
    http_client: reqwest::Client,
}

impl SendGridMailer {
    pub fn new(settings: SendGridSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_client(settings, http_client)
    }

    pub fn with_client(
        settings: SendGridSettings,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let endpoint = settings.api_url.join(MAIL_SEND_PATH).map_err(|e| {
            VigilError::Internal(format!(
                "Invalid SendGrid API url {}: {e}",
                settings.api_url
            ))
        })?;

        Ok(Self {
            settings,
            endpoint,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_request<'a>(
        &'a self,
        tier: InactivityTier,
        contact: &'a InactivityContact,
    ) -> MailSendRequest<'a> {
        MailSendRequest {
            personalizations: [Personalization {
                to: [Address {
                    email: &contact.email,
                    name: Some(&contact.first_name),
                }],
                dynamic_template_data: TemplateData {
                    first_name: &contact.first_name,
                },
            }],
            from: Address {
                email: &self.settings.sender_email,
                name: self.settings.sender_name.as_deref(),
            },
            template_id: self.settings.templates.for_tier(tier),
            asm: self
                .settings
                .unsubscribe_group_id
                .map(|group_id| Asm { group_id }),
        }
    }
}

#[async_trait]
impl InactivityMailer for SendGridMailer {
    async fn send_inactivity_email(
        &self,
        tier: InactivityTier,
        contact: &InactivityContact,
    ) -> Result<()> {
        let request = self.build_request(tier, contact);
        debug!(
            tier = %tier,
            template_id = request.template_id,
            "posting inactivity notice to SendGrid"
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(VigilError::Mail(format!(
            "SendGrid responded with {status}: {}",
            body.trim()
        )))
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    template_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    asm: Option<Asm>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
    dynamic_template_data: TemplateData<'a>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TemplateData<'a> {
    #[serde(rename = "firstName")]
    first_name: &'a str,
}

#[derive(Debug, Serialize)]
struct Asm {
    group_id: u32,
}
