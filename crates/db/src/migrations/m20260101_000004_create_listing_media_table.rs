//! Create listing media table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ListingMedia::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingMedia::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ListingMedia::ListingId).string().not_null())
                    .col(ColumnDef::new(ListingMedia::FileName).string().not_null())
                    .col(ColumnDef::new(ListingMedia::ContentType).string().not_null())
                    .col(ColumnDef::new(ListingMedia::Size).big_integer().not_null())
                    .col(ColumnDef::new(ListingMedia::StorageKey).string().not_null())
                    .col(ColumnDef::new(ListingMedia::Url).text().not_null())
                    .col(
                        ColumnDef::new(ListingMedia::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ListingMedia::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ListingMedia::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_media_listing")
                            .from(ListingMedia::Table, ListingMedia::ListingId)
                            .to(Listing::Table, Listing::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listing_media_listing_id")
                    .table(ListingMedia::Table)
                    .col(ListingMedia::ListingId)
                    .to_owned(),
            )
            .await?;

        // At most one primary media item per listing
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_media_one_primary")
                    .table(ListingMedia::Table)
                    .col(ListingMedia::ListingId)
                    .unique()
                    .and_where(Expr::col(ListingMedia::IsPrimary).eq(true))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ListingMedia::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ListingMedia {
    Table,
    Id,
    ListingId,
    FileName,
    ContentType,
    Size,
    StorageKey,
    Url,
    SortOrder,
    IsPrimary,
    CreatedAt,
}

#[derive(Iden)]
pub enum Listing {
    Table,
    Id,
}
