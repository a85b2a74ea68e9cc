//! Email template rendering engine.
//!
//! Handlebars-backed HTML bodies for the two lead emails. Templates are
//! registered non-strict, so a missing variable renders as an empty string.

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const ATTORNEY_TEMPLATE: &str = "attorney_notification";
pub const LEAD_TEMPLATE: &str = "lead_confirmation";

/// Variables for the attorney notification body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttorneyNotificationData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub resume_path: String,
    pub created_at: String,
}

/// Variables for the lead confirmation body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadConfirmationData {
    pub first_name: String,
    pub last_name: String,
}

/// Template engine for rendering email templates.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    /// Create a new template engine with both templates registered.
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        handlebars
            .register_template_string(ATTORNEY_TEMPLATE, ATTORNEY_HTML_TEMPLATE)
            .map_err(|e| NotificationError::TemplateError(format!("Failed to register {}: {}", ATTORNEY_TEMPLATE, e)))?;
        handlebars
            .register_template_string(LEAD_TEMPLATE, LEAD_HTML_TEMPLATE)
            .map_err(|e| NotificationError::TemplateError(format!("Failed to register {}: {}", LEAD_TEMPLATE, e)))?;

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render<T: Serialize>(&self, template_name: &str, data: &T) -> NotificationResult<String> {
        Ok(self.handlebars.render(template_name, data)?)
    }

    pub fn render_attorney_notification(&self, data: &AttorneyNotificationData) -> NotificationResult<String> {
        debug!(email = %data.email, "Rendering attorney notification");
        self.render(ATTORNEY_TEMPLATE, data)
    }

    pub fn render_lead_confirmation(&self, data: &LeadConfirmationData) -> NotificationResult<String> {
        debug!(first_name = %data.first_name, "Rendering lead confirmation");
        self.render(LEAD_TEMPLATE, data)
    }
}

const ATTORNEY_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>New Lead</title>
</head>
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #1a3c5e;">New Lead Submitted</h2>
    <p>A new prospect has submitted their information through the intake form.</p>
    <table style="border-collapse: collapse; width: 100%;">
        <tr><td style="padding: 8px; font-weight: bold;">First name</td><td style="padding: 8px;">{{first_name}}</td></tr>
        <tr><td style="padding: 8px; font-weight: bold;">Last name</td><td style="padding: 8px;">{{last_name}}</td></tr>
        <tr><td style="padding: 8px; font-weight: bold;">Email</td><td style="padding: 8px;">{{email}}</td></tr>
        <tr><td style="padding: 8px; font-weight: bold;">Resume</td><td style="padding: 8px;">{{resume_path}}</td></tr>
        <tr><td style="padding: 8px; font-weight: bold;">Submitted</td><td style="padding: 8px;">{{created_at}}</td></tr>
    </table>
    <p>Please reach out to the prospect and mark the lead as reached out once contacted.</p>
</body>
</html>
"#;

const LEAD_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Thank you for choosing Alma Legal</title>
</head>
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #1a3c5e;">Thank you, {{first_name}} {{last_name}}!</h2>
    <p>We have received your information and resume.</p>
    <p>One of our attorneys will review your submission and get in touch with you shortly.</p>
    <p>Best regards,<br>The Alma Legal Team</p>
</body>
</html>
"#;
