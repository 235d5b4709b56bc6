//! Email sending functionality
//!
//! Outgoing mail goes through a [`Mailer`]. The SMTP implementation uses
//! lettre's async transport; the mock implementation only logs, for
//! development and testing. Sends are attempted once and never retried.

pub mod smtp;
pub mod templates;

use crate::app_config::EmailConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Email sending result
pub type EmailResult<T> = Result<T, EmailError>;

/// Email errors
#[derive(Debug)]
pub enum EmailError {
    /// SMTP configuration or address error
    ConfigError(String),
    /// Email building error
    BuildError(lettre::error::Error),
    /// Email sending error
    SendError(lettre::transport::smtp::Error),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::ConfigError(msg) => write!(f, "Email config error: {}", msg),
            EmailError::BuildError(e) => write!(f, "Email build error: {}", e),
            EmailError::SendError(e) => write!(f, "Email send error: {}", e),
        }
    }
}

impl std::error::Error for EmailError {}

impl From<lettre::error::Error> for EmailError {
    fn from(e: lettre::error::Error) -> Self {
        EmailError::BuildError(e)
    }
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        EmailError::SendError(e)
    }
}

/// Something that can deliver a plain-text email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body_text: &str) -> EmailResult<()>;

    /// Short description of the delivery target for log lines. Never includes credentials.
    fn describe(&self) -> String;
}

/// Mock mode: just log the email
pub struct MockMailer;

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, to: &str, subject: &str, body_text: &str) -> EmailResult<()> {
        log::info!("MOCK EMAIL:");
        log::info!("  To: {}", to);
        log::info!("  Subject: {}", subject);
        log::info!("  Body: {}", body_text);
        Ok(())
    }

    fn describe(&self) -> String {
        "mock mailer".to_owned()
    }
}

/// Builds the mailer selected by configuration.
pub fn mailer_from_config(config: &EmailConfig) -> EmailResult<Arc<dyn Mailer>> {
    if config.mock {
        log::info!("Email mock mode enabled; messages will only be logged");
        return Ok(Arc::new(MockMailer));
    }
    Ok(Arc::new(smtp::SmtpMailer::new(config)?))
}
