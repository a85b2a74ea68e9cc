use bytes::Bytes;
use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::Display;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::LeadError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Follow-up state of a lead. Any value may be set from any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lead_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "REACHED_OUT")]
    ReachedOut,
}

impl FromStr for LeadStatus {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s).map_err(|_| LeadError::Validation(format!("Invalid status: {}", s)))
    }
}

/// Stored lead record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all leads
    pub email: String,
    /// Object path of the uploaded resume
    pub resume_path: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// New `PENDING` lead with a fresh id
    pub fn new(input: CreateLead, resume_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            resume_path,
            status: LeadStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lead as returned by the API and carried in events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub resume_path: String,
    /// Browser URL of the resume inside the object store console
    pub resume_url: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeadResponse {
    pub fn from_lead(lead: Lead, resume_url: Option<String>) -> Self {
        Self {
            id: lead.id,
            first_name: lead.first_name,
            last_name: lead.last_name,
            email: lead.email,
            resume_path: lead.resume_path,
            resume_url,
            status: lead.status,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

/// Intake form fields, trimmed before validation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLead {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub last_name: String,
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
}

impl CreateLead {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Validate, reporting only the first failing field in form order
    pub fn check(&self) -> Result<(), LeadError> {
        self.validate()
            .map_err(|e| first_failure(&e, &["first_name", "last_name", "email"]))
    }
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLead {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<LeadStatus>,
}

impl UpdateLead {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.status.is_none()
    }

    /// Apply trimmed overrides and re-validate the resulting record
    pub fn apply_to(self, lead: &mut Lead) -> Result<(), LeadError> {
        if let Some(first_name) = self.first_name {
            lead.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = self.last_name {
            lead.last_name = last_name.trim().to_string();
        }
        if let Some(email) = self.email {
            lead.email = email.trim().to_string();
        }
        if let Some(status) = self.status {
            lead.status = status;
        }

        CreateLead::new(&lead.first_name, &lead.last_name, &lead.email).check()
    }
}

/// `PATCH /leads/status` body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LeadStatusUpdateRequest {
    #[validate(email)]
    pub email: String,
    pub status: LeadStatus,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationQuery {
    /// Checked `(page, page_size)`: page ≥ 1, page size in 1..=100
    pub fn validated(&self) -> Result<(u64, u64), LeadError> {
        if self.page < 1 {
            return Err(LeadError::Validation("Page must be >= 1".to_string()));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE as i64 {
            return Err(LeadError::Validation(
                "Page size must be between 1 and 100".to_string(),
            ));
        }
        Ok((self.page as u64, self.page_size as u64))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// `ceil(total / page_size)`, never below 1
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Uploaded resume file
#[derive(Debug, Clone, Default)]
pub struct ResumeUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ResumeUpload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn first_failure(errors: &ValidationErrors, order: &[&str]) -> LeadError {
    let field_errors = errors.field_errors();
    let failing = order
        .iter()
        .find_map(|name| field_errors.get(*name).map(|errs| (*name, errs)))
        .or_else(|| {
            field_errors
                .iter()
                .next()
                .map(|(name, errs)| (&**name, errs))
        });

    match failing {
        Some((field, errs)) => {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            LeadError::Validation(format!("Validation error: {} {}", field, reason))
        }
        None => LeadError::Validation("Validation error".to_string()),
    }
}
