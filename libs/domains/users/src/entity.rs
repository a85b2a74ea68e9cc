use axum_helpers::Role;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::User;

/// Database form of [`Role`], stored in the `user_role` enum type
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "attorney")]
    Attorney,
    #[sea_orm(string_value = "client")]
    Client,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Attorney => UserRole::Attorney,
            Role::Client => UserRole::Client,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Attorney => Role::Attorney,
            UserRole::Client => Role::Client,
        }
    }
}

/// Sea-ORM entity for the `users` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub hashed_password: String,
    pub role: UserRole,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            hashed_password: model.hashed_password,
            role: model.role.into(),
            created_at: model.created_at.into(),
        }
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            hashed_password: Set(user.hashed_password.clone()),
            role: Set(user.role.into()),
            created_at: Set(user.created_at.into()),
        }
    }
}
