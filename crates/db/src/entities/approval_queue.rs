//! Approval queue entity for the listing review workflow.
//!
//! One row per listing (`listing_id` is unique). Resubmission after a
//! rejection re-opens the same row instead of inserting a duplicate, which
//! keeps the one-open-entry-per-listing invariant in the schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::listing::ApprovalStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "approval_queue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Listing awaiting review
    #[sea_orm(unique)]
    pub listing_id: String,

    /// Current decision state
    pub status: ApprovalStatus,

    /// How many times the listing has been submitted
    #[sea_orm(default_value = 1)]
    pub submission_count: i32,

    /// Results of automated compliance checks, JSON array
    #[sea_orm(column_type = "JsonBinary")]
    pub compliance_results: Json,

    /// Moderator who reviewed the submission
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,

    /// Reviewer notes (e.g. rejection reason)
    #[sea_orm(column_type = "Text", nullable)]
    pub review_notes: Option<String>,

    /// When the listing was (last) submitted
    pub submitted_at: DateTimeWithTimeZone,

    /// When the entry was reviewed
    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,
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

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReviewedBy",
        to = "super::user::Column::Id"
    )]
    Reviewer,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
