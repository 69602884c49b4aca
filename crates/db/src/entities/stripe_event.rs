//! Processed Stripe event ledger.
//!
//! The event ID is the primary key; inserting it before running side effects
//! makes replayed webhook deliveries no-ops.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stripe_event")]
pub struct Model {
    /// Stripe event ID (`evt_...`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Event type string as received
    pub event_type: String,

    pub processed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
