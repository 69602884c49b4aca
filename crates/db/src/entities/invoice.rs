//! Invoice entity, mirroring Stripe invoice state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stripe invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "void")]
    Void,
    #[sea_orm(string_value = "uncollectible")]
    Uncollectible,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    /// Upsert key for webhook reconciliation
    #[sea_orm(unique)]
    pub stripe_invoice_id: String,

    #[sea_orm(nullable)]
    pub stripe_subscription_id: Option<String>,

    /// Amount due in the smallest currency unit
    pub amount_due: i64,

    /// Amount paid in the smallest currency unit
    #[sea_orm(default_value = 0)]
    pub amount_paid: i64,

    /// ISO currency code (lowercase, Stripe convention)
    pub currency: String,

    pub status: InvoiceStatus,

    #[sea_orm(nullable)]
    pub hosted_invoice_url: Option<String>,

    #[sea_orm(nullable)]
    pub invoice_pdf: Option<String>,

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
