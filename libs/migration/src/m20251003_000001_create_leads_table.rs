use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(LeadStatus::Enum)
                    .values([LeadStatus::Pending, LeadStatus::ReachedOut])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(pk_uuid(Leads::Id))
                    .col(string_len(Leads::FirstName, 50))
                    .col(string_len(Leads::LastName, 50))
                    .col(string_uniq(Leads::Email))
                    .col(string(Leads::ResumePath))
                    .col(
                        ColumnDef::new(Leads::Status)
                            .enumeration(LeadStatus::Enum, [LeadStatus::Pending, LeadStatus::ReachedOut])
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(timestamp_with_time_zone(Leads::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Leads::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_created_at")
                    .table(Leads::Table)
                    .col(Leads::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leads_status")
                    .table(Leads::Table)
                    .col(Leads::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(LeadStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Leads {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    ResumePath,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadStatus {
    #[sea_orm(iden = "lead_status")]
    Enum,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "REACHED_OUT")]
    ReachedOut,
}
