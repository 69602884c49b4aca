//! Listing entity (properties and developments).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the owner wants to do with the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ListingAction {
    #[sea_orm(string_value = "sell")]
    Sell,
    #[sea_orm(string_value = "rent")]
    Rent,
    #[sea_orm(string_value = "auction")]
    Auction,
}

/// Property category. Keys the property-details variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[sea_orm(string_value = "apartment")]
    Apartment,
    #[sea_orm(string_value = "house")]
    House,
    #[sea_orm(string_value = "farm")]
    Farm,
    #[sea_orm(string_value = "land")]
    Land,
    #[sea_orm(string_value = "commercial")]
    Commercial,
    #[sea_orm(string_value = "shared_living")]
    SharedLiving,
}

/// Listing lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "pending_review")]
    PendingReview,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Moderation decision state, tracked separately from lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner user ID
    pub owner_id: String,

    /// Brand this listing is attributed to (brand-emulator seeded content)
    #[sea_orm(nullable)]
    pub brand_id: Option<String>,

    pub action: ListingAction,

    pub property_type: PropertyType,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Marketing badges, JSON array of strings
    #[sea_orm(column_type = "JsonBinary")]
    pub badges: Json,

    /// Property details, tagged by `property_type`
    #[sea_orm(column_type = "JsonBinary")]
    pub details: Json,

    /// Pricing terms, tagged by `action`
    #[sea_orm(column_type = "JsonBinary")]
    pub pricing: Json,

    /// Full wizard snapshot while the listing is a draft; cleared on submit
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub draft_state: Option<Json>,

    /// Street address
    pub address: String,

    pub city: String,

    #[sea_orm(nullable)]
    pub province: Option<String>,

    #[sea_orm(nullable)]
    pub postal_code: Option<String>,

    #[sea_orm(nullable)]
    pub latitude: Option<f64>,

    #[sea_orm(nullable)]
    pub longitude: Option<f64>,

    pub status: ListingStatus,

    /// Absent until the first submission
    #[sea_orm(nullable)]
    pub approval_status: Option<ApprovalStatus>,

    /// Reviewer's rejection reason, copied from the queue entry
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_published: bool,

    /// Set iff status == published
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    /// Detail-page view counter (denormalized)
    #[sea_orm(default_value = 0)]
    pub view_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,

    #[sea_orm(
        belongs_to = "super::brand_profile::Entity",
        from = "Column::BrandId",
        to = "super::brand_profile::Column::Id",
        on_delete = "SetNull"
    )]
    Brand,

    #[sea_orm(has_many = "super::listing_media::Entity")]
    Media,

    #[sea_orm(has_one = "super::approval_queue::Entity")]
    QueueEntry,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::listing_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl Related<super::brand_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
