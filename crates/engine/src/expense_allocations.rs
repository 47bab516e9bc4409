//! Expense→goal allocation rows.
//!
//! Exactly one per expense: the record of how much of the bill (the user's
//! share) funded the chosen goal. Deleted and recreated on every update.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseAllocation {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub goal_id: Uuid,
    pub amount: MoneyCents,
    pub allocated_at: DateTime<Utc>,
}

impl ExpenseAllocation {
    pub fn new(expense_id: Uuid, goal_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            goal_id,
            amount,
            allocated_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub goal_id: String,
    pub amount: i64,
    pub allocated_at: DateTimeUtc,
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
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Goals,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseAllocation> for ActiveModel {
    fn from(value: &ExpenseAllocation) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            expense_id: ActiveValue::Set(value.expense_id.to_string()),
            goal_id: ActiveValue::Set(value.goal_id.to_string()),
            amount: ActiveValue::Set(value.amount.cents()),
            allocated_at: ActiveValue::Set(value.allocated_at),
        }
    }
}

impl TryFrom<Model> for ExpenseAllocation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("expense allocation not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            expense_id: Uuid::parse_str(&model.expense_id).map_err(|_| not_exists())?,
            goal_id: Uuid::parse_str(&model.goal_id).map_err(|_| not_exists())?,
            amount: MoneyCents::new(model.amount),
            allocated_at: model.allocated_at,
        })
    }
}
