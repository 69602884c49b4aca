//! Create brand profile table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BrandProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BrandProfile::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BrandProfile::Name).string().not_null())
                    .col(
                        ColumnDef::new(BrandProfile::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BrandProfile::Description).text().null())
                    .col(ColumnDef::new(BrandProfile::LogoUrl).string().null())
                    .col(ColumnDef::new(BrandProfile::Website).string().null())
                    .col(ColumnDef::new(BrandProfile::AccentColor).string().null())
                    .col(
                        ColumnDef::new(BrandProfile::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(BrandProfile::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(BrandProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BrandProfile::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_brand_profile_creator")
                            .from(BrandProfile::Table, BrandProfile::CreatedBy)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BrandProfile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BrandProfile {
    Table,
    Id,
    Name,
    Slug,
    Description,
    LogoUrl,
    Website,
    AccentColor,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}
