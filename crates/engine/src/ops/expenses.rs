//! Expense lifecycle ops.
//!
//! The split → payment → netting pipeline is pure (`plan_expense`); the
//! submodules wrap it in single-transaction persistence.

use std::collections::BTreeSet;

use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::{
    CreateExpenseCmd, Currency, Debt, DebtParty, EngineError, ExpenseSplit, MoneyCents,
    ResultEngine, aggregate_payments, compute_shares, net_debts,
};

use super::Engine;

mod list;
mod write;

pub use list::ExpenseDetail;

/// Everything an expense write needs to persist, computed up front.
pub(super) struct ExpensePlan {
    /// The user's own share of the bill (what funds the goal).
    pub(super) user_share: MoneyCents,
    /// What the user personally paid (what debits the account).
    pub(super) user_paid: MoneyCents,
    pub(super) splits: Vec<ExpenseSplit>,
    pub(super) debts: Vec<Debt>,
}

/// Runs the pure pipeline: shares, payment aggregation, debt netting.
///
/// Split rows cover the union of share-holders and payers, so a participant
/// who only fronted money still gets a (zero-share) row. Debt parties are
/// person ids except for the self person, which maps to the owning user.
pub(super) fn plan_expense(
    expense_id: Uuid,
    cmd: &CreateExpenseCmd,
    self_person_id: Uuid,
    currency: Currency,
) -> ResultEngine<ExpensePlan> {
    let shares = compute_shares(cmd.total_bill, cmd.split_type, &cmd.splits, self_person_id)?;
    let payments = aggregate_payments(cmd.total_bill, &cmd.paid_by)?;

    let share_amounts = shares
        .iter()
        .map(|(person_id, share)| (*person_id, share.amount))
        .collect();
    let drafts = net_debts(&share_amounts, &payments);

    let mut splits = Vec::with_capacity(shares.len());
    for (person_id, share) in &shares {
        let paid = payments.get(person_id).copied().unwrap_or_default();
        splits.push(ExpenseSplit::new(
            expense_id,
            *person_id,
            share.amount,
            share.percent_bp,
            share.rate_ppm,
            paid,
        ));
    }
    // Payer-only participants: no share, but their payment must be on record.
    for (person_id, paid) in &payments {
        if !shares.contains_key(person_id) {
            splits.push(ExpenseSplit::new(
                expense_id,
                *person_id,
                MoneyCents::ZERO,
                0,
                0,
                *paid,
            ));
        }
    }

    let party = |person_id: Uuid| -> DebtParty {
        if person_id == self_person_id {
            DebtParty::User {
                user_id: cmd.user_id.clone(),
            }
        } else {
            DebtParty::Person { person_id }
        }
    };
    let debts = drafts
        .into_iter()
        .map(|draft| {
            Debt::new(
                cmd.user_id.clone(),
                expense_id,
                party(draft.payer),
                party(draft.payee),
                draft.amount,
                currency,
                cmd.date,
            )
        })
        .collect();

    let user_share = shares
        .get(&self_person_id)
        .map(|share| share.amount)
        .ok_or_else(|| {
            EngineError::InvalidInput("self participant missing from shares".to_string())
        })?;
    let user_paid = payments.get(&self_person_id).copied().unwrap_or_default();

    Ok(ExpensePlan {
        user_share,
        user_paid,
        splits,
        debts,
    })
}

impl Engine {
    /// Checks that every third-party participant referenced by the command
    /// belongs to the user.
    pub(super) async fn require_participants_owned(
        &self,
        db: &DatabaseTransaction,
        cmd: &CreateExpenseCmd,
        self_person_id: Uuid,
    ) -> ResultEngine<()> {
        let participant_ids: BTreeSet<Uuid> = cmd
            .splits
            .iter()
            .map(|entry| entry.person_id)
            .chain(cmd.paid_by.iter().map(|entry| entry.person_id))
            .filter(|id| *id != self_person_id)
            .collect();
        for person_id in participant_ids {
            self.require_person_owned(db, person_id, &cmd.user_id)
                .await?;
        }
        Ok(())
    }
}
