//! SMTP email provider implementation using lettre.
//!
//! Connects in plain text and upgrades with STARTTLS when the server offers it.

use super::{EmailContent, EmailProvider};
use crate::config::SmtpConfig;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        let from = config
            .from_email
            .parse()
            .map_err(|e| NotificationError::ConfigError(format!("Invalid FROM_EMAIL '{}': {}", config.from_email, e)))?;

        Ok(Self {
            transport,
            from,
            config: Arc::new(config),
        })
    }

    fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let tls = TlsParameters::new(config.host.clone())
            .map_err(|e| NotificationError::ConfigError(format!("Invalid TLS parameters for {}: {}", config.host, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls))
            .timeout(Some(config.timeout));

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(config.username.clone(), config.password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(&self, email: &EmailContent) -> NotificationResult<Message> {
        let to: Mailbox = email
            .to_email
            .parse()
            .map_err(|_| NotificationError::InvalidEmail(email.to_email.clone()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(email.html_body.clone())))?;

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<()> {
        debug!(
            to = %email.to_email,
            subject = %email.subject,
            host = %self.config.host,
            port = %self.config.port,
            "Sending email via SMTP"
        );

        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .inspect_err(|e| error!(to = %email.to_email, error = %e, "Failed to send email via SMTP"))?;

        info!(
            to = %email.to_email,
            code = %response.code(),
            "Email sent via SMTP"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SmtpProvider {
        SmtpProvider::new(SmtpConfig {
            host: "localhost".into(),
            port: 1025,
            ..SmtpConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_message() {
        let provider = provider();
        let message = provider
            .build_message(&EmailContent {
                to_email: "john@test.com".into(),
                subject: "Thank you for choosing Alma Legal".into(),
                html_body: "<p>Hi</p>".into(),
            })
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: john@test.com"));
        assert!(raw.contains("From: notifications@alma.com"));
        assert!(raw.contains("Subject: Thank you for choosing Alma Legal"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_invalid_recipient() {
        let err = provider()
            .build_message(&EmailContent {
                to_email: "not-an-address".into(),
                ..EmailContent::default()
            })
            .unwrap_err();

        assert!(matches!(err, NotificationError::InvalidEmail(addr) if addr == "not-an-address"));
    }

    #[test]
    fn test_invalid_from_address() {
        let result = SmtpProvider::new(SmtpConfig {
            from_email: "nobody".into(),
            ..SmtpConfig::default()
        });

        assert!(matches!(result, Err(NotificationError::ConfigError(_))));
    }
}
