//! Income primitives.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

/// A received income.
///
/// Credits the destination account with the full amount; a fraction of the
/// amount is then routed to each funded goal by the allocation pass (see
/// `income_allocations`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount: MoneyCents,
    /// Opaque reference-data id (income source CRUD is outside the engine).
    pub source_id: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub dest_account_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: i64,
    pub source_id: String,
    pub date: DateTimeUtc,
    pub notes: Option<String>,
    pub dest_account_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::income_allocations::Entity")]
    Allocations,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::DestAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::income_allocations::Entity> for Entity {
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

impl From<&Income> for ActiveModel {
    fn from(value: &Income) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            amount: ActiveValue::Set(value.amount.cents()),
            source_id: ActiveValue::Set(value.source_id.clone()),
            date: ActiveValue::Set(value.date),
            notes: ActiveValue::Set(value.notes.clone()),
            dest_account_id: ActiveValue::Set(value.dest_account_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("income not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            user_id: model.user_id,
            name: model.name,
            amount: MoneyCents::new(model.amount),
            source_id: model.source_id,
            date: model.date,
            notes: model.notes,
            dest_account_id: Uuid::parse_str(&model.dest_account_id).map_err(|_| not_exists())?,
        })
    }
}
