//! The module contains the `Goal` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BasisPoints, EngineError, MoneyCents, money::BP_SCALE};

/// A savings goal.
///
/// A goal accumulates two kinds of funding:
/// - the user's own share of each expense (via the expense allocation), and
/// - a fixed fraction of every income, given by `allocation_rate_bp`.
///
/// `balance` is mutated only by those paths and their reversals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub balance: MoneyCents,
    /// Fraction of each income routed to this goal, in basis points
    /// (0..=10_000).
    pub allocation_rate_bp: BasisPoints,
    pub target_amount: Option<MoneyCents>,
    pub target_date: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn new(
        user_id: String,
        name: String,
        allocation_rate_bp: BasisPoints,
    ) -> Result<Self, EngineError> {
        validate_allocation_rate(allocation_rate_bp)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            balance: MoneyCents::ZERO,
            allocation_rate_bp,
            target_amount: None,
            target_date: None,
        })
    }
}

pub(crate) fn validate_allocation_rate(rate_bp: BasisPoints) -> Result<(), EngineError> {
    if !(0..=BP_SCALE).contains(&rate_bp) {
        return Err(EngineError::InvalidInput(format!(
            "allocation rate must be within 0..=10000 basis points, got {rate_bp}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub balance: i64,
    pub allocation_rate_bp: i64,
    pub target_amount: Option<i64>,
    pub target_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_allocations::Entity")]
    ExpenseAllocations,
    #[sea_orm(has_many = "super::income_allocations::Entity")]
    IncomeAllocations,
}

impl Related<super::expense_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseAllocations.def()
    }
}

impl Related<super::income_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomeAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(value: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            balance: ActiveValue::Set(value.balance.cents()),
            allocation_rate_bp: ActiveValue::Set(value.allocation_rate_bp),
            target_amount: ActiveValue::Set(value.target_amount.map(MoneyCents::cents)),
            target_date: ActiveValue::Set(value.target_date),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("goal not exists".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            balance: MoneyCents::new(model.balance),
            allocation_rate_bp: model.allocation_rate_bp,
            target_amount: model.target_amount.map(MoneyCents::new),
            target_date: model.target_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_goal_rejects_out_of_range_rate() {
        assert!(Goal::new("alice".into(), "Trip".into(), 10_001).is_err());
        assert!(Goal::new("alice".into(), "Trip".into(), -1).is_err());
        assert!(Goal::new("alice".into(), "Trip".into(), 0).is_ok());
        assert!(Goal::new("alice".into(), "Trip".into(), 10_000).is_ok());
    }
}
