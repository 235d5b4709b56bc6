//! SMTP email sending implementation
use super::{EmailError, EmailResult, Mailer};
use crate::app_config::EmailConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
    port: u16,
}

impl SmtpMailer {
    /// Builds the transport. Each send opens its own connection.
    pub fn new(config: &EmailConfig) -> EmailResult<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| EmailError::ConfigError(format!("Invalid from address: {}", e)))?;

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        let mut builder = builder.port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            host: config.smtp_host.clone(),
            port: config.smtp_port,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, body_text: &str) -> EmailResult<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| EmailError::ConfigError(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body_text.to_string())?;

        self.transport.send(email).await?;

        log::info!("Email sent successfully to: {}", to);

        Ok(())
    }

    fn describe(&self) -> String {
        format!("smtp://{}:{}", self.host, self.port)
    }
}
