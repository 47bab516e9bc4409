//! Command structs for engine operations.
//!
//! These types group parameters for write operations (expense/income
//! create/update), keeping call sites readable and avoiding long argument
//! lists. They are the typed form of the transport-level request bodies.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, PaidByEntry, SplitEntry, SplitType};

/// Create a shared-bill expense.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub user_id: String,
    pub name: String,
    /// The full bill among all participants (the persisted expense stores
    /// only the user's own side, derived from the splits).
    pub total_bill: MoneyCents,
    pub split_type: SplitType,
    /// May be empty: the user absorbs whatever the splits don't cover.
    pub splits: Vec<SplitEntry>,
    /// Must not be empty.
    pub paid_by: Vec<PaidByEntry>,
    pub date: DateTime<Utc>,
    pub account_id: Uuid,
    pub goal_id: Uuid,
    pub category_id: String,
    pub type_id: String,
    pub notes: Option<String>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        total_bill: MoneyCents,
        split_type: SplitType,
        date: DateTime<Utc>,
        account_id: Uuid,
        goal_id: Uuid,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            total_bill,
            split_type,
            splits: Vec::new(),
            paid_by: Vec::new(),
            date,
            account_id,
            goal_id,
            category_id: String::new(),
            type_id: String::new(),
            notes: None,
        }
    }

    #[must_use]
    pub fn split(mut self, person_id: Uuid, value: i64) -> Self {
        self.splits.push(SplitEntry::new(person_id, value));
        self
    }

    #[must_use]
    pub fn paid_by(mut self, person_id: Uuid, amount: MoneyCents) -> Self {
        self.paid_by.push(PaidByEntry::new(person_id, amount));
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = category_id.into();
        self
    }

    #[must_use]
    pub fn type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = type_id.into();
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Update an existing expense.
///
/// The payload is a full replacement, not a patch: splits, payments, debts
/// and the allocation are all regenerated from this command after the old
/// effects are reversed.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub expense_id: Uuid,
    pub payload: CreateExpenseCmd,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(expense_id: Uuid, payload: CreateExpenseCmd) -> Self {
        Self {
            expense_id,
            payload,
        }
    }
}

/// Create an income.
#[derive(Clone, Debug)]
pub struct CreateIncomeCmd {
    pub user_id: String,
    pub name: String,
    pub amount: MoneyCents,
    pub source_id: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub dest_account_id: Uuid,
    /// Goals to allocate this income across. Must not be empty.
    pub allocations: Vec<Uuid>,
}

impl CreateIncomeCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount: MoneyCents,
        source_id: impl Into<String>,
        date: DateTime<Utc>,
        dest_account_id: Uuid,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            amount,
            source_id: source_id.into(),
            date,
            notes: None,
            dest_account_id,
            allocations: Vec::new(),
        }
    }

    #[must_use]
    pub fn allocate_to(mut self, goal_id: Uuid) -> Self {
        self.allocations.push(goal_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Update an existing income.
///
/// Allocations are not part of the payload: they are recomputed from scratch
/// against every goal the user currently owns.
#[derive(Clone, Debug)]
pub struct UpdateIncomeCmd {
    pub income_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub amount: MoneyCents,
    pub source_id: String,
    pub dest_account_id: Uuid,
    /// `None` keeps the stored value.
    pub date: Option<DateTime<Utc>>,
    /// `None` keeps the stored value.
    pub notes: Option<String>,
}

impl UpdateIncomeCmd {
    #[must_use]
    pub fn new(
        income_id: Uuid,
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount: MoneyCents,
        source_id: impl Into<String>,
        dest_account_id: Uuid,
    ) -> Self {
        Self {
            income_id,
            user_id: user_id.into(),
            name: name.into(),
            amount,
            source_id: source_id.into(),
            dest_account_id,
            date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
