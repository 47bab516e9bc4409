//! Debt primitives.
//!
//! A `Debt` is a directed IOU between two bill participants, generated by the
//! netting pass to track one underpayer's obligation toward one overpayer for
//! a single expense. `original_amount` is immutable; `remaining_amount` is
//! reserved for future settlement. Debts are regenerated wholesale on every
//! expense update and deleted with the expense.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents};

/// One side of a debt: either the authenticated user or a third-party person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DebtParty {
    User { user_id: String },
    Person { person_id: Uuid },
}

/// Internal string used for the `payer_kind`/`payee_kind` columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DebtPartyKind {
    User,
    Person,
}

impl DebtPartyKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Person => "person",
        }
    }
}

impl DebtParty {
    pub(crate) fn kind(&self) -> DebtPartyKind {
        match self {
            Self::User { .. } => DebtPartyKind::User,
            Self::Person { .. } => DebtPartyKind::Person,
        }
    }

    pub(crate) fn id_string(&self) -> String {
        match self {
            Self::User { user_id } => user_id.clone(),
            Self::Person { person_id } => person_id.to_string(),
        }
    }

    pub(crate) fn from_columns(kind: &str, id: &str) -> Result<Self, EngineError> {
        match kind {
            "user" => Ok(Self::User {
                user_id: id.to_string(),
            }),
            "person" => Ok(Self::Person {
                person_id: Uuid::parse_str(id)
                    .map_err(|_| EngineError::KeyNotFound("person not exists".to_string()))?,
            }),
            other => Err(EngineError::InvalidInput(format!(
                "invalid debt party kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Pending,
    Settled,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
        }
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "settled" => Ok(Self::Settled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    /// The user who owns the expense this debt was generated from.
    pub user_id: String,
    pub expense_id: Uuid,
    pub payer: DebtParty,
    pub payee: DebtParty,
    pub original_amount: MoneyCents,
    pub remaining_amount: MoneyCents,
    pub currency: Currency,
    pub date: DateTime<Utc>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(
        user_id: String,
        expense_id: Uuid,
        payer: DebtParty,
        payee: DebtParty,
        amount: MoneyCents,
        currency: Currency,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            expense_id,
            payer,
            payee,
            original_amount: amount,
            remaining_amount: amount,
            currency,
            date,
            status: DebtStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub expense_id: String,
    pub payer_kind: String,
    pub payer_id: String,
    pub payee_kind: String,
    pub payee_id: String,
    pub original_amount: i64,
    pub remaining_amount: i64,
    pub currency: String,
    pub date: DateTimeUtc,
    pub status: String,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(value: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            expense_id: ActiveValue::Set(value.expense_id.to_string()),
            payer_kind: ActiveValue::Set(value.payer.kind().as_str().to_string()),
            payer_id: ActiveValue::Set(value.payer.id_string()),
            payee_kind: ActiveValue::Set(value.payee.kind().as_str().to_string()),
            payee_id: ActiveValue::Set(value.payee.id_string()),
            original_amount: ActiveValue::Set(value.original_amount.cents()),
            remaining_amount: ActiveValue::Set(value.remaining_amount.cents()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            date: ActiveValue::Set(value.date),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let not_exists = || EngineError::KeyNotFound("debt not exists".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| not_exists())?,
            user_id: model.user_id,
            expense_id: Uuid::parse_str(&model.expense_id).map_err(|_| not_exists())?,
            payer: DebtParty::from_columns(&model.payer_kind, &model.payer_id)?,
            payee: DebtParty::from_columns(&model.payee_kind, &model.payee_id)?,
            original_amount: MoneyCents::new(model.original_amount),
            remaining_amount: MoneyCents::new(model.remaining_amount),
            currency: Currency::try_from(model.currency.as_str())?,
            date: model.date,
            status: DebtStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn model() -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            expense_id: Uuid::new_v4().to_string(),
            payer_kind: "person".to_string(),
            payer_id: Uuid::new_v4().to_string(),
            payee_kind: "user".to_string(),
            payee_id: "alice".to_string(),
            original_amount: 4000,
            remaining_amount: 4000,
            currency: "INR".to_string(),
            date: Utc::now(),
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn corrupt_stored_currency_is_an_error() {
        let mut bad = model();
        bad.currency = "XYZ".to_string();
        let err = Debt::try_from(bad).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn valid_row_round_trips() {
        let debt = Debt::try_from(model()).unwrap();
        assert_eq!(debt.currency, Currency::Inr);
        assert_eq!(debt.status, DebtStatus::Pending);
        assert_eq!(
            debt.payee,
            DebtParty::User {
                user_id: "alice".to_string()
            }
        );
    }
}
