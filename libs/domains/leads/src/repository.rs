use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{LeadError, LeadResult};
use crate::models::Lead;

/// Repository trait for lead persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Insert a new lead. Fails with `Conflict` when the email is taken.
    async fn create(&self, lead: Lead) -> LeadResult<Lead>;

    async fn get_by_id(&self, id: Uuid) -> LeadResult<Option<Lead>>;

    async fn get_by_email(&self, email: &str) -> LeadResult<Option<Lead>>;

    /// Page of leads, newest first
    async fn list(&self, offset: u64, limit: u64) -> LeadResult<Vec<Lead>>;

    async fn count(&self) -> LeadResult<u64>;

    /// Overwrite a stored lead. `None` when no row was affected.
    async fn update(&self, lead: Lead) -> LeadResult<Option<Lead>>;
}

/// In-memory implementation of LeadRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryLeadRepository {
    leads: Arc<RwLock<HashMap<Uuid, Lead>>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn create(&self, lead: Lead) -> LeadResult<Lead> {
        let mut leads = self.leads.write().await;

        if leads.values().any(|l| l.email == lead.email) {
            return Err(LeadError::duplicate_email(&lead.email));
        }

        leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn get_by_id(&self, id: Uuid) -> LeadResult<Option<Lead>> {
        Ok(self.leads.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> LeadResult<Option<Lead>> {
        let leads = self.leads.read().await;
        Ok(leads.values().find(|l| l.email == email).cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> LeadResult<Vec<Lead>> {
        let leads = self.leads.read().await;

        let mut result: Vec<Lead> = leads.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> LeadResult<u64> {
        Ok(self.leads.read().await.len() as u64)
    }

    async fn update(&self, lead: Lead) -> LeadResult<Option<Lead>> {
        let mut leads = self.leads.write().await;

        if !leads.contains_key(&lead.id) {
            return Ok(None);
        }
        if leads.values().any(|l| l.id != lead.id && l.email == lead.email) {
            return Err(LeadError::duplicate_email(&lead.email));
        }

        leads.insert(lead.id, lead.clone());
        Ok(Some(lead))
    }
}
