//! Shared-bill engine: splits a bill across participants, aggregates who
//! actually paid, nets the difference into pairwise debts, and keeps account
//! and goal balances reconciled through expense and income lifecycles.
//!
//! All money is integer minor units ([`MoneyCents`]); every write operation
//! runs inside a single database transaction.

pub use accounts::Account;
pub use commands::{CreateExpenseCmd, CreateIncomeCmd, UpdateExpenseCmd, UpdateIncomeCmd};
pub use currency::Currency;
pub use debts::{Debt, DebtParty, DebtStatus};
pub use error::EngineError;
pub use expense_allocations::ExpenseAllocation;
pub use expense_splits::ExpenseSplit;
pub use expenses::{Expense, SplitType};
pub use goals::Goal;
pub use income_allocations::IncomeAllocation;
pub use incomes::Income;
pub use money::{BP_SCALE, BasisPoints, MoneyCents, PPM_SCALE};
pub use netting::{DebtDraft, net_debts};
pub use ops::{Engine, EngineBuilder, ExpenseDetail, IncomeDetail};
pub use payments::{PaidByEntry, aggregate_payments};
pub use persons::{Person, SELF_PERSON_NAME};
pub use split::{Share, SplitEntry, compute_shares};

mod accounts;
mod commands;
mod currency;
mod debts;
mod error;
mod expense_allocations;
mod expense_splits;
mod expenses;
mod goals;
mod income_allocations;
mod incomes;
mod money;
mod netting;
mod ops;
mod payments;
mod persons;
mod split;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
