use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    Debt, EngineError, Expense, ExpenseAllocation, ExpenseSplit, ResultEngine, debts,
    expense_allocations, expense_splits, expenses,
};

use super::super::{Engine, with_tx};

/// An expense with everything the pipeline generated for it.
#[derive(Clone, Debug)]
pub struct ExpenseDetail {
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
    pub debts: Vec<Debt>,
    pub allocation: ExpenseAllocation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ExpensesCursor {
    date: DateTime<Utc>,
    expense_id: String,
}

impl ExpensesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid expenses cursor".to_string()))
    }
}

impl Engine {
    /// Return one expense with its splits, debts and goal allocation.
    pub async fn expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<ExpenseDetail> {
        with_tx!(self, |db_tx| {
            let expense = Expense::try_from(
                self.require_expense_owned(&db_tx, expense_id, user_id)
                    .await?,
            )?;

            let splits = expense_splits::Entity::find()
                .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseSplit::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let debts = debts::Entity::find()
                .filter(debts::Column::ExpenseId.eq(expense_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Debt::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let allocation = expense_allocations::Entity::find()
                .filter(expense_allocations::Column::ExpenseId.eq(expense_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("expense allocation not exists".to_string())
                })?;
            let allocation = ExpenseAllocation::try_from(allocation)?;

            Ok(ExpenseDetail {
                expense,
                splits,
                debts,
                allocation,
            })
        })
    }

    /// Lists the user's expenses, with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(date DESC, id DESC)`.
    pub async fn list_expenses(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Expense>, Option<String>)> {
        with_tx!(self, |db_tx| {
            let limit_plus_one = limit.saturating_add(1);
            let mut query = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = ExpensesCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(expenses::Column::Date.lt(cursor.date))
                        .add(
                            Condition::all()
                                .add(expenses::Column::Date.eq(cursor.date))
                                .add(expenses::Column::Id.lt(cursor.expense_id)),
                        ),
                );
            }

            let rows: Vec<expenses::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Expense> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Expense::try_from(model)?);
            }

            let next_cursor = out.last().map(|expense| ExpensesCursor {
                date: expense.date,
                expense_id: expense.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
