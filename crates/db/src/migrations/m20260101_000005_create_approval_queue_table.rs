//! Create approval queue table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApprovalQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalQueue::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // One queue row per listing; resubmission re-opens it
                    .col(
                        ColumnDef::new(ApprovalQueue::ListingId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ApprovalQueue::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ApprovalQueue::SubmissionCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ApprovalQueue::ComplianceResults)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApprovalQueue::ReviewedBy).string().null())
                    .col(ColumnDef::new(ApprovalQueue::ReviewNotes).text().null())
                    .col(
                        ColumnDef::new(ApprovalQueue::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ApprovalQueue::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_queue_listing")
                            .from(ApprovalQueue::Table, ApprovalQueue::ListingId)
                            .to(Listing::Table, Listing::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_queue_reviewer")
                            .from(ApprovalQueue::Table, ApprovalQueue::ReviewedBy)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approval_queue_status")
                    .table(ApprovalQueue::Table)
                    .col(ApprovalQueue::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApprovalQueue::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ApprovalQueue {
    Table,
    Id,
    ListingId,
    Status,
    SubmissionCount,
    ComplianceResults,
    ReviewedBy,
    ReviewNotes,
    SubmittedAt,
    ReviewedAt,
}

#[derive(Iden)]
pub enum Listing {
    Table,
    Id,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}
