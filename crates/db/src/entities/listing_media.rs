//! Listing media entity (uploaded photos/plans per listing).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing_media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub listing_id: String,

    /// Original file name
    pub file_name: String,

    /// MIME type
    pub content_type: String,

    /// File size in bytes, as reported at presign time
    pub size: i64,

    /// Storage key for object storage
    pub storage_key: String,

    /// Public URL
    pub url: String,

    /// Position within the listing's gallery
    #[sea_orm(default_value = 0)]
    pub sort_order: i32,

    /// At most one per listing
    #[sea_orm(default_value = false)]
    pub is_primary: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id",
        on_delete = "Cascade"
    )]
    Listing,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
