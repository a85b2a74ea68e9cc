use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{LeadError, LeadResult},
    models::Lead,
    repository::LeadRepository,
};

/// PostgreSQL-backed [`LeadRepository`]
#[derive(Clone)]
pub struct PgLeadRepository {
    db: DatabaseConnection,
}

impl PgLeadRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(email: &str, err: DbErr) -> LeadError {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return LeadError::duplicate_email(email);
    }
    tracing::error!(error = %err, "Lead query failed");
    LeadError::Dependency("Database error".to_string())
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn create(&self, lead: Lead) -> LeadResult<Lead> {
        let active_model: entity::ActiveModel = (&lead).into();

        let model = entity::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| db_error(&lead.email, e))?;

        tracing::info!(lead_id = %model.id, "Created lead");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> LeadResult<Option<Lead>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("", e))?;

        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> LeadResult<Option<Lead>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| db_error(email, e))?;

        Ok(model.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u64) -> LeadResult<Vec<Lead>> {
        let models = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| db_error("", e))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> LeadResult<u64> {
        entity::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| db_error("", e))
    }

    async fn update(&self, lead: Lead) -> LeadResult<Option<Lead>> {
        let active_model: entity::ActiveModel = (&lead).into();

        match entity::Entity::update(active_model).exec(&self.db).await {
            Ok(model) => {
                tracing::info!(lead_id = %model.id, "Updated lead");
                Ok(Some(model.into()))
            }
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(db_error(&lead.email, e)),
        }
    }
}
