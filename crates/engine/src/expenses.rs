//! Expense primitives.
//!
//! An `Expense` is the persisted record of one shared bill. It deliberately
//! stores the **user's own** side of the bill, not the whole bill:
//! `total_amount` is the user's share and `user_paid` is what the user
//! personally contributed. The full division lives in the per-participant
//! `expense_splits` rows, and over/underpayment between participants lives in
//! `debts`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

/// How the bill is divided among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    /// Split values are basis points of the bill total.
    Percentage,
    /// Split values are absolute minor-unit amounts.
    Amount,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Amount => "amount",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "amount" => Ok(Self::Amount),
            other => Err(EngineError::InvalidInput(format!(
                "invalid split type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub goal_id: Uuid,
    pub name: String,
    /// The user's own share of the bill (not the full bill).
    pub total_amount: MoneyCents,
    /// What the user personally paid toward the bill.
    pub user_paid: MoneyCents,
    pub split_type: SplitType,
    pub date: DateTime<Utc>,
    /// Opaque reference-data ids; their CRUD lives outside the engine.
    pub category_id: String,
    pub type_id: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub goal_id: String,
    pub name: String,
    pub total_amount: i64,
    pub user_paid: i64,
    pub split_type: String,
    pub date: DateTimeUtc,
    pub category_id: String,
    pub type_id: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    Splits,
    #[sea_orm(has_many = "super::debts::Entity")]
    Debts,
    #[sea_orm(has_many = "super::expense_allocations::Entity")]
    Allocations,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Splits.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl Related<super::expense_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(value: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            account_id: ActiveValue::Set(value.account_id.to_string()),
            goal_id: ActiveValue::Set(value.goal_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            total_amount: ActiveValue::Set(value.total_amount.cents()),
            user_paid: ActiveValue::Set(value.user_paid.cents()),
            split_type: ActiveValue::Set(value.split_type.as_str().to_string()),
            date: ActiveValue::Set(value.date),
            category_id: ActiveValue::Set(value.category_id.clone()),
            type_id: ActiveValue::Set(value.type_id.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("expense not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            user_id: model.user_id,
            account_id: Uuid::parse_str(&model.account_id).map_err(|_| not_exists())?,
            goal_id: Uuid::parse_str(&model.goal_id).map_err(|_| not_exists())?,
            name: model.name,
            total_amount: MoneyCents::new(model.total_amount),
            user_paid: MoneyCents::new(model.user_paid),
            split_type: SplitType::try_from(model.split_type.as_str())?,
            date: model.date,
            category_id: model.category_id,
            type_id: model.type_id,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
