//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_user_table;
mod m20260101_000002_create_brand_profile_table;
mod m20260101_000003_create_listing_table;
mod m20260101_000004_create_listing_media_table;
mod m20260101_000005_create_approval_queue_table;
mod m20260101_000006_create_billing_tables;
mod m20260101_000007_create_activity_event_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_user_table::Migration),
            Box::new(m20260101_000002_create_brand_profile_table::Migration),
            Box::new(m20260101_000003_create_listing_table::Migration),
            Box::new(m20260101_000004_create_listing_media_table::Migration),
            Box::new(m20260101_000005_create_approval_queue_table::Migration),
            Box::new(m20260101_000006_create_billing_tables::Migration),
            Box::new(m20260101_000007_create_activity_event_table::Migration),
        ]
    }
}
