use chrono::Utc;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, CreateExpenseCmd, EngineError, Expense, ExpenseAllocation, Goal, ResultEngine,
    UpdateExpenseCmd, debts, expense_allocations, expense_splits, expenses,
};

use super::super::{
    Engine, normalize_optional_text, normalize_required_name, set_account_balance,
    set_goal_balance, with_tx,
};
use super::{ExpenseDetail, plan_expense};

impl Engine {
    /// Record a shared-bill expense.
    ///
    /// Computes shares, aggregates payments and nets debts, then persists the
    /// expense with its splits, debts and goal allocation while debiting the
    /// account by what the user paid and crediting the goal with the user's
    /// share. Everything happens in one transaction.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<ExpenseDetail> {
        let name = normalize_required_name(&cmd.name, "expense")?;
        with_tx!(self, |db_tx| {
            let account = Account::try_from(
                self.require_account_owned(&db_tx, cmd.account_id, &cmd.user_id)
                    .await?,
            )?;
            let goal = Goal::try_from(
                self.require_goal_owned(&db_tx, cmd.goal_id, &cmd.user_id)
                    .await?,
            )?;
            let self_person = self.self_person(&db_tx, &cmd.user_id).await?;
            self.require_participants_owned(&db_tx, &cmd, self_person.id)
                .await?;

            let expense_id = Uuid::new_v4();
            let plan = plan_expense(expense_id, &cmd, self_person.id, account.currency)?;

            if plan.user_paid > account.balance {
                return Err(EngineError::InsufficientFunds(format!(
                    "account balance is {}, user paid {}",
                    account.balance, plan.user_paid
                )));
            }

            let expense = Expense {
                id: expense_id,
                user_id: cmd.user_id.clone(),
                account_id: cmd.account_id,
                goal_id: cmd.goal_id,
                name,
                total_amount: plan.user_share,
                user_paid: plan.user_paid,
                split_type: cmd.split_type,
                date: cmd.date,
                category_id: cmd.category_id.clone(),
                type_id: cmd.type_id.clone(),
                notes: normalize_optional_text(cmd.notes.as_deref()),
                created_at: Utc::now(),
            };
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for split in &plan.splits {
                expense_splits::ActiveModel::from(split)
                    .insert(&db_tx)
                    .await?;
            }
            for debt in &plan.debts {
                debts::ActiveModel::from(debt).insert(&db_tx).await?;
            }
            let allocation = ExpenseAllocation::new(expense_id, cmd.goal_id, plan.user_share);
            expense_allocations::ActiveModel::from(&allocation)
                .insert(&db_tx)
                .await?;

            set_account_balance(&db_tx, account.id, account.balance - plan.user_paid).await?;
            set_goal_balance(&db_tx, goal.id, goal.balance + plan.user_share).await?;

            tracing::info!(
                expense_id = %expense_id,
                user_id = %cmd.user_id,
                user_paid = plan.user_paid.cents(),
                user_share = plan.user_share.cents(),
                debts = plan.debts.len(),
                "expense created"
            );

            Ok(ExpenseDetail {
                expense,
                splits: plan.splits,
                debts: plan.debts,
                allocation,
            })
        })
    }

    /// Replace an expense with a new payload.
    ///
    /// Reverses the old account/goal effects, deletes the old splits, debts
    /// and allocation, and re-runs the create pipeline, all in one
    /// transaction. When the old and new expense share an account (or goal)
    /// the reversal and re-apply collapse into a single balance write, so the
    /// funds check sees the post-reversal balance rather than a transient
    /// intermediate state.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<ExpenseDetail> {
        let payload = cmd.payload;
        let name = normalize_required_name(&payload.name, "expense")?;
        with_tx!(self, |db_tx| {
            let old = Expense::try_from(
                self.require_expense_owned(&db_tx, cmd.expense_id, &payload.user_id)
                    .await?,
            )?;
            let account = Account::try_from(
                self.require_account_owned(&db_tx, payload.account_id, &payload.user_id)
                    .await?,
            )?;
            let goal = Goal::try_from(
                self.require_goal_owned(&db_tx, payload.goal_id, &payload.user_id)
                    .await?,
            )?;
            let self_person = self.self_person(&db_tx, &payload.user_id).await?;
            self.require_participants_owned(&db_tx, &payload, self_person.id)
                .await?;

            let plan = plan_expense(old.id, &payload, self_person.id, account.currency)?;

            if old.account_id == payload.account_id {
                let post_reversal = account.balance + old.user_paid;
                if plan.user_paid > post_reversal {
                    return Err(EngineError::InsufficientFunds(format!(
                        "account balance is {post_reversal}, user paid {}",
                        plan.user_paid
                    )));
                }
                set_account_balance(&db_tx, account.id, post_reversal - plan.user_paid).await?;
            } else {
                if plan.user_paid > account.balance {
                    return Err(EngineError::InsufficientFunds(format!(
                        "account balance is {}, user paid {}",
                        account.balance, plan.user_paid
                    )));
                }
                let old_account = Account::try_from(
                    self.require_account_owned(&db_tx, old.account_id, &payload.user_id)
                        .await?,
                )?;
                set_account_balance(&db_tx, old_account.id, old_account.balance + old.user_paid)
                    .await?;
                set_account_balance(&db_tx, account.id, account.balance - plan.user_paid).await?;
            }

            if old.goal_id == payload.goal_id {
                set_goal_balance(
                    &db_tx,
                    goal.id,
                    goal.balance - old.total_amount + plan.user_share,
                )
                .await?;
            } else {
                let old_goal = Goal::try_from(
                    self.require_goal_owned(&db_tx, old.goal_id, &payload.user_id)
                        .await?,
                )?;
                set_goal_balance(&db_tx, old_goal.id, old_goal.balance - old.total_amount).await?;
                set_goal_balance(&db_tx, goal.id, goal.balance + plan.user_share).await?;
            }

            self.delete_expense_children(&db_tx, old.id).await?;

            let expense = Expense {
                id: old.id,
                user_id: payload.user_id.clone(),
                account_id: payload.account_id,
                goal_id: payload.goal_id,
                name,
                total_amount: plan.user_share,
                user_paid: plan.user_paid,
                split_type: payload.split_type,
                date: payload.date,
                category_id: payload.category_id.clone(),
                type_id: payload.type_id.clone(),
                notes: normalize_optional_text(payload.notes.as_deref()),
                created_at: old.created_at,
            };
            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            for split in &plan.splits {
                expense_splits::ActiveModel::from(split)
                    .insert(&db_tx)
                    .await?;
            }
            for debt in &plan.debts {
                debts::ActiveModel::from(debt).insert(&db_tx).await?;
            }
            let allocation = ExpenseAllocation::new(old.id, payload.goal_id, plan.user_share);
            expense_allocations::ActiveModel::from(&allocation)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                expense_id = %old.id,
                user_id = %payload.user_id,
                user_paid = plan.user_paid.cents(),
                user_share = plan.user_share.cents(),
                debts = plan.debts.len(),
                "expense updated"
            );

            Ok(ExpenseDetail {
                expense,
                splits: plan.splits,
                debts: plan.debts,
                allocation,
            })
        })
    }

    /// Delete an expense, restoring the account and goal balances it moved.
    pub async fn delete_expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = Expense::try_from(
                self.require_expense_owned(&db_tx, expense_id, user_id)
                    .await?,
            )?;
            let account = Account::try_from(
                self.require_account_owned(&db_tx, old.account_id, user_id)
                    .await?,
            )?;
            let goal = Goal::try_from(self.require_goal_owned(&db_tx, old.goal_id, user_id).await?)?;

            set_account_balance(&db_tx, account.id, account.balance + old.user_paid).await?;
            set_goal_balance(&db_tx, goal.id, goal.balance - old.total_amount).await?;

            self.delete_expense_children(&db_tx, old.id).await?;
            expenses::Entity::delete_by_id(old.id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                expense_id = %old.id,
                user_id = %user_id,
                user_paid = old.user_paid.cents(),
                user_share = old.total_amount.cents(),
                "expense deleted"
            );

            Ok(())
        })
    }

    async fn delete_expense_children(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<()> {
        expense_splits::Entity::delete_many()
            .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(db_tx)
            .await?;
        debts::Entity::delete_many()
            .filter(debts::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(db_tx)
            .await?;
        expense_allocations::Entity::delete_many()
            .filter(expense_allocations::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(db_tx)
            .await?;
        Ok(())
    }
}
