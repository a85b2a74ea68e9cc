use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LeadError, LeadResult};
use crate::events::default_metadata;
use crate::models::{
    CreateLead, Lead, LeadListResponse, LeadResponse, LeadStatus, PaginationQuery, ResumeUpload,
    UpdateLead, total_pages,
};
use crate::publisher::LeadEventPublisher;
use crate::repository::LeadRepository;
use crate::storage::{ResumeStorage, upload_resume};

/// Lead intake workflow: validation, duplicate check, resume upload,
/// persistence and event emission.
pub struct LeadService<R: LeadRepository, S: ResumeStorage, P: LeadEventPublisher> {
    repository: Arc<R>,
    storage: Arc<S>,
    publisher: Arc<P>,
}

impl<R: LeadRepository, S: ResumeStorage, P: LeadEventPublisher> Clone for LeadService<R, S, P> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            storage: self.storage.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

impl<R: LeadRepository, S: ResumeStorage, P: LeadEventPublisher> LeadService<R, S, P> {
    pub fn new(repository: R, storage: S, publisher: P) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(storage), Arc::new(publisher))
    }

    pub fn from_shared(repository: Arc<R>, storage: Arc<S>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            storage,
            publisher,
        }
    }

    /// Register a lead.
    ///
    /// The duplicate check runs before the upload so a rejected lead leaves
    /// no object behind. Publishing is best-effort: once the record is
    /// stored the lead is returned even if the event never reaches the broker.
    pub async fn create_lead(&self, input: CreateLead, resume: &ResumeUpload) -> LeadResult<LeadResponse> {
        let input = CreateLead::new(&input.first_name, &input.last_name, &input.email);
        input.check()?;

        if self.repository.get_by_email(&input.email).await?.is_some() {
            return Err(LeadError::duplicate_email(&input.email));
        }

        let resume_path = upload_resume(self.storage.as_ref(), &input.email, resume).await?;

        let lead = self.repository.create(Lead::new(input, resume_path)).await?;
        info!(lead_id = %lead.id, "Lead created");

        let response = self.to_response(lead);
        self.publish_lead_created(&response).await;

        Ok(response)
    }

    async fn publish_lead_created(&self, lead: &LeadResponse) {
        if !self
            .publisher
            .publish_lead_created(lead, default_metadata())
            .await
        {
            warn!(lead_id = %lead.id, "Lead stored but created event was not delivered");
        }
    }

    /// Page of leads, newest first
    pub async fn get_paginated_leads(&self, query: &PaginationQuery) -> LeadResult<LeadListResponse> {
        let (page, page_size) = query.validated()?;

        let total = self.repository.count().await?;
        // Pages past the end skip the query; huge page numbers never reach it
        let leads = match (page - 1).checked_mul(page_size).filter(|&offset| offset < total) {
            Some(offset) => self.repository.list(offset, page_size).await?,
            None => Vec::new(),
        };

        Ok(LeadListResponse {
            leads: leads.into_iter().map(|l| self.to_response(l)).collect(),
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        })
    }

    pub async fn get_lead_by_id(&self, id: Uuid) -> LeadResult<LeadResponse> {
        let lead = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found_id(id))?;
        Ok(self.to_response(lead))
    }

    /// Partial update. A new resume is stored under the lead's email as it
    /// stands after the field overrides.
    pub async fn update_lead(
        &self,
        id: Uuid,
        update: UpdateLead,
        resume: Option<ResumeUpload>,
    ) -> LeadResult<LeadResponse> {
        let mut lead = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found_id(id))?;

        let previous_email = lead.email.clone();
        update.apply_to(&mut lead)?;

        if lead.email != previous_email && self.repository.get_by_email(&lead.email).await?.is_some() {
            return Err(LeadError::duplicate_email(&lead.email));
        }

        if let Some(resume) = resume {
            lead.resume_path = upload_resume(self.storage.as_ref(), &lead.email, &resume).await?;
        }

        lead.touch();
        let updated = self
            .repository
            .update(lead)
            .await?
            .ok_or_else(|| not_found_id(id))?;

        info!(lead_id = %id, "Lead updated");
        Ok(self.to_response(updated))
    }

    /// Set the status of the lead registered under `email`.
    ///
    /// Callers are expected to have checked the attorney role already.
    pub async fn update_lead_status(&self, email: &str, status: LeadStatus) -> LeadResult<LeadResponse> {
        let mut lead = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| LeadError::NotFound(format!("Lead with email {} not found", email)))?;

        lead.status = status;
        lead.touch();

        let updated = self
            .repository
            .update(lead)
            .await?
            .ok_or_else(|| LeadError::Dependency("Failed to update lead status".to_string()))?;

        info!(lead_id = %updated.id, status = %status, "Lead status updated");
        Ok(self.to_response(updated))
    }

    fn to_response(&self, lead: Lead) -> LeadResponse {
        let url = (!lead.resume_path.is_empty()).then(|| self.storage.browser_url(&lead.resume_path));
        LeadResponse::from_lead(lead, url)
    }
}

fn not_found_id(id: Uuid) -> LeadError {
    LeadError::NotFound(format!("Lead {} not found", id))
}
