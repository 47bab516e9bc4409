use sea_orm::{ActiveValue, DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

mod access;
mod accounts;
mod expenses;
mod goals;
mod incomes;
mod persons;

pub use expenses::ExpenseDetail;
pub use incomes::IncomeDetail;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The split/debt/balance engine.
///
/// Stateless apart from the database handle: every operation reads the rows
/// it needs inside its own transaction, so there is no in-memory cache to
/// drift out of sync.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

async fn set_account_balance(
    db: &DatabaseTransaction,
    account_id: Uuid,
    balance: MoneyCents,
) -> ResultEngine<()> {
    let active = crate::accounts::ActiveModel {
        id: ActiveValue::Set(account_id.to_string()),
        balance: ActiveValue::Set(balance.cents()),
        ..Default::default()
    };
    active.update(db).await?;
    Ok(())
}

async fn set_goal_balance(
    db: &DatabaseTransaction,
    goal_id: Uuid,
    balance: MoneyCents,
) -> ResultEngine<()> {
    let active = crate::goals::ActiveModel {
        id: ActiveValue::Set(goal_id.to_string()),
        balance: ActiveValue::Set(balance.cents()),
        ..Default::default()
    };
    active.update(db).await?;
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
