//! Income→goal allocation rows.
//!
//! One per funded goal per income: the record of how much of the income was
//! routed to that goal by its allocation rate. Reversed (goal debited, row
//! deleted) before every income update or delete.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeAllocation {
    pub id: Uuid,
    pub user_id: String,
    pub income_id: Uuid,
    pub goal_id: Uuid,
    pub amount: MoneyCents,
    pub allocated_at: DateTime<Utc>,
}

impl IncomeAllocation {
    pub fn new(user_id: String, income_id: Uuid, goal_id: Uuid, amount: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            income_id,
            goal_id,
            amount,
            allocated_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub income_id: String,
    pub goal_id: String,
    pub amount: i64,
    pub allocated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::incomes::Entity",
        from = "Column::IncomeId",
        to = "super::incomes::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Incomes,
    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Goals,
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&IncomeAllocation> for ActiveModel {
    fn from(value: &IncomeAllocation) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            income_id: ActiveValue::Set(value.income_id.to_string()),
            goal_id: ActiveValue::Set(value.goal_id.to_string()),
            amount: ActiveValue::Set(value.amount.cents()),
            allocated_at: ActiveValue::Set(value.allocated_at),
        }
    }
}

impl TryFrom<Model> for IncomeAllocation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("income allocation not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            user_id: model.user_id,
            income_id: Uuid::parse_str(&model.income_id).map_err(|_| not_exists())?,
            goal_id: Uuid::parse_str(&model.goal_id).map_err(|_| not_exists())?,
            amount: MoneyCents::new(model.amount),
            allocated_at: model.allocated_at,
        })
    }
}
