//! User entity (buyers, developers, staff).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Contact email
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    pub password_hash: String,

    /// Access token for bearer auth
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Phone number shown on published listings
    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Agency/company name (developers)
    #[sea_orm(nullable)]
    pub agency_name: Option<String>,

    /// Set when billing activates the developer agency
    #[sea_orm(nullable)]
    pub agency_activated_at: Option<DateTimeWithTimeZone>,

    /// Stripe customer ID, set on first checkout
    #[sea_orm(unique, nullable)]
    pub stripe_customer_id: Option<String>,

    /// Can this user list properties?
    #[sea_orm(default_value = false)]
    pub is_developer: bool,

    /// Can this user review the approval queue?
    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    /// Full admin (brand emulator, billing overview)
    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    /// Is this account suspended?
    #[sea_orm(default_value = false)]
    pub is_suspended: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::listing::Entity")]
    Listings,

    #[sea_orm(has_many = "super::subscription::Entity")]
    Subscriptions,

    #[sea_orm(has_many = "super::activity_event::Entity")]
    ActivityEvents,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
