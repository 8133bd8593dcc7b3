//! Mail transports implementing [`InactivityMailer`](crate::mail::InactivityMailer).

pub mod log;
pub mod sendgrid;

pub use log::LogMailer;
pub use sendgrid::{
    DEFAULT_SENDGRID_API_URL, SendGridMailer, SendGridSettings, TierTemplates,
};
