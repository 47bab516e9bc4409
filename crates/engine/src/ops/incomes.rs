use std::collections::{BTreeMap, BTreeSet};

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, BP_SCALE, CreateIncomeCmd, EngineError, Goal, Income, IncomeAllocation, MoneyCents,
    ResultEngine, UpdateIncomeCmd, goals, income_allocations, incomes,
};

use super::{
    Engine, normalize_optional_text, normalize_required_name, set_account_balance,
    set_goal_balance, with_tx,
};

/// An income with its goal allocations.
#[derive(Clone, Debug)]
pub struct IncomeDetail {
    pub income: Income,
    pub allocations: Vec<IncomeAllocation>,
}

fn validate_income_amount(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "income amount must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Each goal receives `floor(amount * rate_bp / 10_000)`: allocations never
/// round up, so their sum never exceeds the income.
fn allocation_for(amount: MoneyCents, goal: &Goal) -> MoneyCents {
    amount.mul_div_floor(goal.allocation_rate_bp, BP_SCALE)
}

impl Engine {
    /// Record an income: credit the destination account and route a fraction
    /// of the amount to each listed goal by its allocation rate.
    pub async fn create_income(&self, cmd: CreateIncomeCmd) -> ResultEngine<IncomeDetail> {
        let name = normalize_required_name(&cmd.name, "income")?;
        validate_income_amount(cmd.amount)?;
        if cmd.allocations.is_empty() {
            return Err(EngineError::InvalidInput(
                "allocations must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let account = Account::try_from(
                self.require_account_owned(&db_tx, cmd.dest_account_id, &cmd.user_id)
                    .await?,
            )?;

            let income = Income {
                id: Uuid::new_v4(),
                user_id: cmd.user_id.clone(),
                name,
                amount: cmd.amount,
                source_id: cmd.source_id.clone(),
                date: cmd.date,
                notes: normalize_optional_text(cmd.notes.as_deref()),
                dest_account_id: cmd.dest_account_id,
            };
            incomes::ActiveModel::from(&income).insert(&db_tx).await?;

            let mut seen: BTreeSet<Uuid> = BTreeSet::new();
            let mut allocations = Vec::new();
            for goal_id in &cmd.allocations {
                if !seen.insert(*goal_id) {
                    continue;
                }
                let goal = Goal::try_from(
                    self.require_goal_owned(&db_tx, *goal_id, &cmd.user_id)
                        .await?,
                )?;
                let alloc_amount = allocation_for(cmd.amount, &goal);
                if !alloc_amount.is_positive() {
                    continue;
                }
                set_goal_balance(&db_tx, goal.id, goal.balance + alloc_amount).await?;
                let allocation = IncomeAllocation::new(
                    cmd.user_id.clone(),
                    income.id,
                    goal.id,
                    alloc_amount,
                );
                income_allocations::ActiveModel::from(&allocation)
                    .insert(&db_tx)
                    .await?;
                allocations.push(allocation);
            }

            set_account_balance(&db_tx, account.id, account.balance + cmd.amount).await?;

            tracing::info!(
                income_id = %income.id,
                user_id = %cmd.user_id,
                amount = cmd.amount.cents(),
                funded_goals = allocations.len(),
                "income created"
            );

            Ok(IncomeDetail {
                income,
                allocations,
            })
        })
    }

    /// Replace an income with a new payload.
    ///
    /// Reverses every existing goal allocation, applies the account delta
    /// (collapsed to one write when the destination account is unchanged),
    /// then re-allocates the new amount against every goal the user currently
    /// owns, not just the previously funded ones. One transaction.
    pub async fn update_income(&self, cmd: UpdateIncomeCmd) -> ResultEngine<IncomeDetail> {
        let name = normalize_required_name(&cmd.name, "income")?;
        validate_income_amount(cmd.amount)?;

        with_tx!(self, |db_tx| {
            let old = Income::try_from(
                self.require_income_owned(&db_tx, cmd.income_id, &cmd.user_id)
                    .await?,
            )?;

            // Work on an in-memory snapshot of all owned goals so reversal
            // and re-apply on the same goal collapse into one write.
            let mut owned_goals: BTreeMap<Uuid, Goal> = BTreeMap::new();
            for model in goals::Entity::find()
                .filter(goals::Column::UserId.eq(cmd.user_id.to_string()))
                .all(&db_tx)
                .await?
            {
                let goal = Goal::try_from(model)?;
                owned_goals.insert(goal.id, goal);
            }
            let original_balances: BTreeMap<Uuid, MoneyCents> = owned_goals
                .iter()
                .map(|(id, goal)| (*id, goal.balance))
                .collect();

            let old_rows = income_allocations::Entity::find()
                .filter(income_allocations::Column::IncomeId.eq(old.id.to_string()))
                .all(&db_tx)
                .await?;
            for row in old_rows {
                let allocation = IncomeAllocation::try_from(row)?;
                let goal = owned_goals
                    .get_mut(&allocation.goal_id)
                    .ok_or_else(|| EngineError::KeyNotFound("goal not exists".to_string()))?;
                goal.balance -= allocation.amount;
            }
            income_allocations::Entity::delete_many()
                .filter(income_allocations::Column::IncomeId.eq(old.id.to_string()))
                .exec(&db_tx)
                .await?;

            if old.dest_account_id == cmd.dest_account_id {
                let account = Account::try_from(
                    self.require_account_owned(&db_tx, cmd.dest_account_id, &cmd.user_id)
                        .await?,
                )?;
                set_account_balance(
                    &db_tx,
                    account.id,
                    account.balance - old.amount + cmd.amount,
                )
                .await?;
            } else {
                let old_account = Account::try_from(
                    self.require_account_owned(&db_tx, old.dest_account_id, &cmd.user_id)
                        .await?,
                )?;
                let new_account = Account::try_from(
                    self.require_account_owned(&db_tx, cmd.dest_account_id, &cmd.user_id)
                        .await?,
                )?;
                set_account_balance(&db_tx, old_account.id, old_account.balance - old.amount)
                    .await?;
                set_account_balance(&db_tx, new_account.id, new_account.balance + cmd.amount)
                    .await?;
            }

            let mut allocations = Vec::new();
            for goal in owned_goals.values_mut() {
                let alloc_amount = allocation_for(cmd.amount, goal);
                if !alloc_amount.is_positive() {
                    continue;
                }
                goal.balance += alloc_amount;
                let allocation =
                    IncomeAllocation::new(cmd.user_id.clone(), old.id, goal.id, alloc_amount);
                income_allocations::ActiveModel::from(&allocation)
                    .insert(&db_tx)
                    .await?;
                allocations.push(allocation);
            }

            for (goal_id, goal) in &owned_goals {
                let original = original_balances
                    .get(goal_id)
                    .copied()
                    .unwrap_or_default();
                if goal.balance != original {
                    set_goal_balance(&db_tx, *goal_id, goal.balance).await?;
                }
            }

            let income = Income {
                id: old.id,
                user_id: cmd.user_id.clone(),
                name,
                amount: cmd.amount,
                source_id: cmd.source_id.clone(),
                date: cmd.date.unwrap_or(old.date),
                notes: normalize_optional_text(cmd.notes.as_deref()).or(old.notes),
                dest_account_id: cmd.dest_account_id,
            };
            incomes::ActiveModel::from(&income).update(&db_tx).await?;

            tracing::info!(
                income_id = %income.id,
                user_id = %cmd.user_id,
                amount = cmd.amount.cents(),
                funded_goals = allocations.len(),
                "income updated"
            );

            Ok(IncomeDetail {
                income,
                allocations,
            })
        })
    }

    /// Delete an income, restoring the account and goal balances it moved.
    pub async fn delete_income(&self, income_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = Income::try_from(
                self.require_income_owned(&db_tx, income_id, user_id)
                    .await?,
            )?;
            let account = Account::try_from(
                self.require_account_owned(&db_tx, old.dest_account_id, user_id)
                    .await?,
            )?;

            let rows = income_allocations::Entity::find()
                .filter(income_allocations::Column::IncomeId.eq(old.id.to_string()))
                .all(&db_tx)
                .await?;
            for row in rows {
                let allocation = IncomeAllocation::try_from(row)?;
                let goal = Goal::try_from(
                    self.require_goal_owned(&db_tx, allocation.goal_id, user_id)
                        .await?,
                )?;
                set_goal_balance(&db_tx, goal.id, goal.balance - allocation.amount).await?;
            }
            income_allocations::Entity::delete_many()
                .filter(income_allocations::Column::IncomeId.eq(old.id.to_string()))
                .exec(&db_tx)
                .await?;

            set_account_balance(&db_tx, account.id, account.balance - old.amount).await?;
            incomes::Entity::delete_by_id(old.id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                income_id = %old.id,
                user_id = %user_id,
                amount = old.amount.cents(),
                "income deleted"
            );

            Ok(())
        })
    }

    /// Return one income with its allocations.
    pub async fn income(&self, income_id: Uuid, user_id: &str) -> ResultEngine<IncomeDetail> {
        with_tx!(self, |db_tx| {
            let income = Income::try_from(
                self.require_income_owned(&db_tx, income_id, user_id)
                    .await?,
            )?;
            let allocations = income_allocations::Entity::find()
                .filter(income_allocations::Column::IncomeId.eq(income.id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(IncomeAllocation::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(IncomeDetail {
                income,
                allocations,
            })
        })
    }

    /// List the user's incomes, newest first, with allocations attached.
    pub async fn list_incomes(&self, user_id: &str) -> ResultEngine<Vec<IncomeDetail>> {
        with_tx!(self, |db_tx| {
            let income_models = incomes::Entity::find()
                .filter(incomes::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(incomes::Column::Date)
                .order_by_desc(incomes::Column::Id)
                .all(&db_tx)
                .await?;

            let mut by_income: BTreeMap<Uuid, Vec<IncomeAllocation>> = BTreeMap::new();
            for row in income_allocations::Entity::find()
                .filter(income_allocations::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
            {
                let allocation = IncomeAllocation::try_from(row)?;
                by_income
                    .entry(allocation.income_id)
                    .or_default()
                    .push(allocation);
            }

            let mut out = Vec::with_capacity(income_models.len());
            for model in income_models {
                let income = Income::try_from(model)?;
                let allocations = by_income.remove(&income.id).unwrap_or_default();
                out.push(IncomeDetail {
                    income,
                    allocations,
                });
            }
            Ok(out)
        })
    }
}
