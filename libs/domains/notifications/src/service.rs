//! Lead notification dispatch.

use crate::error::NotificationResult;
use crate::providers::{EmailContent, EmailProvider};
use crate::templates::{AttorneyNotificationData, LeadConfirmationData, TemplateEngine};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const LEAD_CONFIRMATION_SUBJECT: &str = "Thank you for choosing Alma Legal";

/// Sends the attorney notification and the lead confirmation for one lead.
pub struct NotificationService<E: EmailProvider> {
    provider: Arc<E>,
    templates: TemplateEngine,
    attorney_email: String,
}

impl<E: EmailProvider> Clone for NotificationService<E> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            templates: self.templates.clone(),
            attorney_email: self.attorney_email.clone(),
        }
    }
}

impl<E: EmailProvider> NotificationService<E> {
    pub fn new(provider: Arc<E>, templates: TemplateEngine, attorney_email: impl Into<String>) -> Self {
        Self {
            provider,
            templates,
            attorney_email: attorney_email.into(),
        }
    }

    pub fn provider(&self) -> &E {
        &self.provider
    }

    /// Attempt both emails; true only when both were accepted.
    ///
    /// Each send is isolated, so a failure on one side never prevents the
    /// other and nothing is returned as an error.
    pub async fn send_lead_email(&self, lead_data: &Map<String, Value>) -> bool {
        let lead_email = field(lead_data, "email");

        let attorney_sent = match self.send_attorney_email(lead_data).await {
            Ok(()) => {
                info!(to = %self.attorney_email, "Attorney email sent");
                true
            }
            Err(e) => {
                error!(error = %e, provider = self.provider.name(), "Attorney email failed");
                false
            }
        };

        let lead_sent = match self.send_lead_confirmation(lead_data).await {
            Ok(()) => {
                info!(to = %lead_email, "Lead confirmation sent");
                true
            }
            Err(e) => {
                error!(error = %e, provider = self.provider.name(), "Lead confirmation failed");
                false
            }
        };

        if attorney_sent && lead_sent {
            info!(email = %lead_email, "Both emails sent");
            true
        } else {
            warn!(
                email = %lead_email,
                attorney_sent,
                lead_sent,
                "Partial email success"
            );
            false
        }
    }

    async fn send_attorney_email(&self, lead_data: &Map<String, Value>) -> NotificationResult<()> {
        let data = AttorneyNotificationData {
            first_name: field(lead_data, "first_name"),
            last_name: field(lead_data, "last_name"),
            email: field(lead_data, "email"),
            resume_path: if lead_data.contains_key("resume_path") {
                field(lead_data, "resume_path")
            } else {
                "Not provided".to_string()
            },
            created_at: field(lead_data, "created_at"),
        };

        let html_body = self.templates.render_attorney_notification(&data)?;
        let email = EmailContent {
            to_email: self.attorney_email.clone(),
            subject: format!("New Lead: {} {}", data.first_name, data.last_name),
            html_body,
        };

        self.provider.send(&email).await
    }

    async fn send_lead_confirmation(&self, lead_data: &Map<String, Value>) -> NotificationResult<()> {
        let data = LeadConfirmationData {
            first_name: field(lead_data, "first_name"),
            last_name: field(lead_data, "last_name"),
        };

        let html_body = self.templates.render_lead_confirmation(&data)?;
        let email = EmailContent {
            to_email: field(lead_data, "email"),
            subject: LEAD_CONFIRMATION_SUBJECT.to_string(),
            html_body,
        };

        self.provider.send(&email).await
    }
}

/// Missing and null values read as empty; non-strings are stringified
fn field(data: &Map<String, Value>, name: &str) -> String {
    match data.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::providers::{InMemoryEmailProvider, MockEmailProvider};
    use serde_json::json;

    const ATTORNEY: &str = "attorney@alma.com";

    fn lead_data() -> Map<String, Value> {
        json!({
            "id": "2b0f0f8e-0d4e-4f55-9d4a-3f7d1b1f3c11",
            "first_name": "John",
            "last_name": "Doe",
            "email": "john@test.com",
            "resume_path": "john@test.com/resume/cv.pdf",
            "status": "PENDING",
            "created_at": "2026-01-01T00:00:00Z"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn service(provider: &InMemoryEmailProvider) -> NotificationService<InMemoryEmailProvider> {
        NotificationService::new(Arc::new(provider.clone()), TemplateEngine::new().unwrap(), ATTORNEY)
    }

    #[tokio::test]
    async fn test_sends_both_emails() {
        let provider = InMemoryEmailProvider::new();

        assert!(service(&provider).send_lead_email(&lead_data()).await);

        let attorney = provider.sent_to(ATTORNEY);
        assert_eq!(attorney.len(), 1);
        assert_eq!(attorney[0].subject, "New Lead: John Doe");
        assert!(attorney[0].html_body.contains("john@test.com/resume/cv.pdf"));

        let lead = provider.sent_to("john@test.com");
        assert_eq!(lead.len(), 1);
        assert_eq!(lead[0].subject, LEAD_CONFIRMATION_SUBJECT);
        assert!(lead[0].html_body.contains("John"));
    }

    #[tokio::test]
    async fn test_attorney_failure_still_sends_confirmation() {
        let provider = InMemoryEmailProvider::new();
        provider.fail_for(ATTORNEY);

        assert!(!service(&provider).send_lead_email(&lead_data()).await);
        assert_eq!(provider.sent_to("john@test.com").len(), 1);
        assert!(provider.sent_to(ATTORNEY).is_empty());
    }

    #[tokio::test]
    async fn test_lead_failure_still_sends_attorney_email() {
        let provider = InMemoryEmailProvider::new();
        provider.fail_for("john@test.com");

        assert!(!service(&provider).send_lead_email(&lead_data()).await);
        assert_eq!(provider.sent_to(ATTORNEY).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_render_empty() {
        let provider = InMemoryEmailProvider::new();
        let mut data = Map::new();
        data.insert("email".into(), json!("jane@test.com"));
        data.insert("first_name".into(), Value::Null);

        assert!(service(&provider).send_lead_email(&data).await);

        let attorney = &provider.sent_to(ATTORNEY)[0];
        assert_eq!(attorney.subject, "New Lead:  ");
        assert!(attorney.html_body.contains("Not provided"));
    }

    #[tokio::test]
    async fn test_provider_errors_become_false() {
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .times(2)
            .returning(|_| Err(NotificationError::ProviderError("connection refused".into())));
        provider.expect_name().return_const("mock");

        let service = NotificationService::new(Arc::new(provider), TemplateEngine::new().unwrap(), ATTORNEY);

        assert!(!service.send_lead_email(&lead_data()).await);
    }

    #[test]
    fn test_field_stringifies_values() {
        let data = json!({"n": 3, "s": "x", "z": null}).as_object().cloned().unwrap();
        assert_eq!(field(&data, "n"), "3");
        assert_eq!(field(&data, "s"), "x");
        assert_eq!(field(&data, "z"), "");
        assert_eq!(field(&data, "missing"), "");
    }
}
