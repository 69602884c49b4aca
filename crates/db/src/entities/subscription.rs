//! Subscription entity, mirroring Stripe subscription state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stripe subscription status, as reported by webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "trialing")]
    Trialing,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "past_due")]
    PastDue,
    #[sea_orm(string_value = "canceled")]
    Canceled,
    #[sea_orm(string_value = "incomplete")]
    Incomplete,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Local user the subscription belongs to
    pub user_id: String,

    pub stripe_customer_id: String,

    /// Upsert key for webhook reconciliation
    #[sea_orm(unique)]
    pub stripe_subscription_id: String,

    /// Stripe price ID of the plan
    pub price_id: String,

    pub status: SubscriptionStatus,

    #[sea_orm(nullable)]
    pub current_period_end: Option<DateTimeWithTimeZone>,

    #[sea_orm(default_value = false)]
    pub cancel_at_period_end: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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
