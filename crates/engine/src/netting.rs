//! Debt netting: compares share vs. paid per participant and produces
//! pairwise obligations.
//!
//! Each underpayer's shortfall is attributed across all overpayers in
//! proportion to how much each one overpaid, rather than an arbitrary
//! pairing. This keeps, per participant, the sum of debts owed equal to that
//! participant's deficit and the sum of debts receivable equal to their
//! credit (up to one cent of proportional rounding per overpayer).

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::MoneyCents;

/// A computed obligation, not yet tied to debt-party identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebtDraft {
    pub payer: Uuid,
    pub payee: Uuid,
    pub amount: MoneyCents,
}

/// Nets per-participant shares against payments.
///
/// Operates over the union of both key spaces: a participant who only paid
/// has share 0, one who only owes a share has paid 0. Settled participants
/// (diff exactly 0) produce nothing. If nobody overpaid there is nothing to
/// net and no debts are created.
pub fn net_debts(
    shares: &BTreeMap<Uuid, MoneyCents>,
    payments: &BTreeMap<Uuid, MoneyCents>,
) -> Vec<DebtDraft> {
    let mut overpayers: Vec<(Uuid, MoneyCents)> = Vec::new();
    let mut underpayers: Vec<(Uuid, MoneyCents)> = Vec::new();

    let participants: BTreeMap<Uuid, ()> = shares
        .keys()
        .chain(payments.keys())
        .map(|id| (*id, ()))
        .collect();

    for person_id in participants.keys() {
        let share = shares.get(person_id).copied().unwrap_or_default();
        let paid = payments.get(person_id).copied().unwrap_or_default();
        let diff = paid - share;
        if diff.is_positive() {
            overpayers.push((*person_id, diff));
        } else if diff.is_negative() {
            underpayers.push((*person_id, -diff));
        }
    }

    let total_overpaid: i64 = overpayers.iter().map(|(_, credit)| credit.cents()).sum();
    if total_overpaid == 0 {
        return Vec::new();
    }

    let mut drafts = Vec::new();
    for (payer, deficit) in &underpayers {
        for (payee, credit) in &overpayers {
            let owed = deficit.mul_div_round_half_up(credit.cents(), total_overpaid);
            if owed.cents() < 1 {
                continue;
            }
            drafts.push(DebtDraft {
                payer: *payer,
                payee: *payee,
                amount: owed,
            });
        }
    }
    drafts
}
