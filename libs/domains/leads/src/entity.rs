use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{Lead, LeadStatus};

/// Sea-ORM entity for the `leads` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub resume_path: String,
    pub status: LeadStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lead {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            resume_path: model.resume_path,
            status: model.status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<&Lead> for ActiveModel {
    fn from(lead: &Lead) -> Self {
        ActiveModel {
            id: Set(lead.id),
            first_name: Set(lead.first_name.clone()),
            last_name: Set(lead.last_name.clone()),
            email: Set(lead.email.clone()),
            resume_path: Set(lead.resume_path.clone()),
            status: Set(lead.status),
            created_at: Set(lead.created_at.into()),
            updated_at: Set(lead.updated_at.into()),
        }
    }
}
