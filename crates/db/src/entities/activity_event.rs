//! Activity event entity backing the developer dashboard feed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    #[sea_orm(string_value = "listing_created")]
    ListingCreated,
    #[sea_orm(string_value = "listing_submitted")]
    ListingSubmitted,
    #[sea_orm(string_value = "listing_approved")]
    ListingApproved,
    #[sea_orm(string_value = "listing_rejected")]
    ListingRejected,
    #[sea_orm(string_value = "listing_published")]
    ListingPublished,
    #[sea_orm(string_value = "media_uploaded")]
    MediaUploaded,
    #[sea_orm(string_value = "subscription_activated")]
    SubscriptionActivated,
    #[sea_orm(string_value = "invoice_paid")]
    InvoicePaid,
    #[sea_orm(string_value = "payment_failed")]
    PaymentFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User whose feed this event belongs to
    pub user_id: String,

    #[sea_orm(nullable)]
    pub listing_id: Option<String>,

    pub kind: ActivityKind,

    /// Human-readable summary line
    pub message: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
