//! Create listing table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listing::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listing::OwnerId).string().not_null())
                    .col(ColumnDef::new(Listing::BrandId).string().null())
                    .col(
                        ColumnDef::new(Listing::Action)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listing::PropertyType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Listing::Title).string().not_null())
                    .col(ColumnDef::new(Listing::Description).text().not_null())
                    .col(ColumnDef::new(Listing::Badges).json_binary().not_null())
                    .col(ColumnDef::new(Listing::Details).json_binary().not_null())
                    .col(ColumnDef::new(Listing::Pricing).json_binary().not_null())
                    .col(ColumnDef::new(Listing::DraftState).json_binary().null())
                    .col(ColumnDef::new(Listing::Address).string().not_null())
                    .col(ColumnDef::new(Listing::City).string().not_null())
                    .col(ColumnDef::new(Listing::Province).string().null())
                    .col(ColumnDef::new(Listing::PostalCode).string().null())
                    .col(ColumnDef::new(Listing::Latitude).double().null())
                    .col(ColumnDef::new(Listing::Longitude).double().null())
                    .col(
                        ColumnDef::new(Listing::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Listing::ApprovalStatus)
                            .string_len(16)
                            .null(),
                    )
                    .col(ColumnDef::new(Listing::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(Listing::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listing::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listing::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listing::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listing::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_owner")
                            .from(Listing::Table, Listing::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_brand")
                            .from(Listing::Table, Listing::BrandId)
                            .to(BrandProfile::Table, BrandProfile::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listing_owner_id")
                    .table(Listing::Table)
                    .col(Listing::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listing_status")
                    .table(Listing::Table)
                    .col(Listing::Status)
                    .to_owned(),
            )
            .await?;

        // Browse queries filter on publication + type + city
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_published_type_city")
                    .table(Listing::Table)
                    .col(Listing::IsPublished)
                    .col(Listing::PropertyType)
                    .col(Listing::City)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listing::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Listing {
    Table,
    Id,
    OwnerId,
    BrandId,
    Action,
    PropertyType,
    Title,
    Description,
    Badges,
    Details,
    Pricing,
    DraftState,
    Address,
    City,
    Province,
    PostalCode,
    Latitude,
    Longitude,
    Status,
    ApprovalStatus,
    RejectionReason,
    IsPublished,
    PublishedAt,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}

#[derive(Iden)]
pub enum BrandProfile {
    Table,
    Id,
}
