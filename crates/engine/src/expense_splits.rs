//! Per-participant split rows.
//!
//! One row per participant per expense, recording that participant's share of
//! the bill and what they actually paid. Rows are regenerated wholesale on
//! every expense create/update (never patched in place) and deleted with the
//! expense.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BasisPoints, EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub person_id: Uuid,
    /// This participant's share of the bill, in minor units.
    pub share_amount: MoneyCents,
    /// Share as basis points of the bill total.
    pub share_percent_bp: BasisPoints,
    /// Share as parts-per-million of the bill total.
    pub share_rate_ppm: i64,
    /// What this participant actually paid toward the bill.
    pub paid_amount: MoneyCents,
    pub has_paid: bool,
}

impl ExpenseSplit {
    pub fn new(
        expense_id: Uuid,
        person_id: Uuid,
        share_amount: MoneyCents,
        share_percent_bp: BasisPoints,
        share_rate_ppm: i64,
        paid_amount: MoneyCents,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            person_id,
            share_amount,
            share_percent_bp,
            share_rate_ppm,
            paid_amount,
            has_paid: paid_amount.is_positive(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub person_id: String,
    pub share_amount: i64,
    pub share_percent_bp: i64,
    pub share_rate_ppm: i64,
    pub paid_amount: i64,
    pub has_paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::persons::Entity",
        from = "Column::PersonId",
        to = "super::persons::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Persons,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::persons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Persons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseSplit> for ActiveModel {
    fn from(value: &ExpenseSplit) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            expense_id: ActiveValue::Set(value.expense_id.to_string()),
            person_id: ActiveValue::Set(value.person_id.to_string()),
            share_amount: ActiveValue::Set(value.share_amount.cents()),
            share_percent_bp: ActiveValue::Set(value.share_percent_bp),
            share_rate_ppm: ActiveValue::Set(value.share_rate_ppm),
            paid_amount: ActiveValue::Set(value.paid_amount.cents()),
            has_paid: ActiveValue::Set(value.has_paid),
        }
    }
}

impl TryFrom<Model> for ExpenseSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("expense split not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            expense_id: Uuid::parse_str(&model.expense_id).map_err(|_| not_exists())?,
            person_id: Uuid::parse_str(&model.person_id).map_err(|_| not_exists())?,
            share_amount: MoneyCents::new(model.share_amount),
            share_percent_bp: model.share_percent_bp,
            share_rate_ppm: model.share_rate_ppm,
            paid_amount: MoneyCents::new(model.paid_amount),
            has_paid: model.has_paid,
        })
    }
}
