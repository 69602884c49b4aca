//! Create activity event table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityEvent::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityEvent::UserId).string().not_null())
                    .col(ColumnDef::new(ActivityEvent::ListingId).string().null())
                    .col(ColumnDef::new(ActivityEvent::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(ActivityEvent::Message).string().not_null())
                    .col(
                        ColumnDef::new(ActivityEvent::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_event_user")
                            .from(ActivityEvent::Table, ActivityEvent::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_event_user_id")
                    .table(ActivityEvent::Table)
                    .col(ActivityEvent::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityEvent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ActivityEvent {
    Table,
    Id,
    UserId,
    ListingId,
    Kind,
    Message,
    CreatedAt,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}
