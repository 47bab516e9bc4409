//! The module contains the `Account` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents};

/// A spending account.
///
/// An account represents a real bank account, wallet or card the user pays
/// bills from. Its `balance` is mutated only by the expense/income
/// reconciliation paths: an expense subtracts what the user personally paid,
/// an income adds the received amount, and reversals undo exactly those
/// deltas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, generated once and persisted so the account can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub balance: MoneyCents,
    pub currency: Currency,
}

impl Account {
    pub fn new(user_id: String, name: String, balance: MoneyCents, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            balance,
            currency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub balance: i64,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::incomes::Entity")]
    Incomes,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            balance: ActiveValue::Set(value.balance.cents()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            balance: MoneyCents::new(model.balance),
            currency: Currency::try_from(model.currency.as_str())?,
        })
    }
}
