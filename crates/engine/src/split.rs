//! Share computation: turns a split specification into per-participant
//! amounts.
//!
//! The split list may be empty or partial; whatever part of the bill it does
//! not cover (including cent-level rounding residue from percentage shares)
//! is absorbed by the owning user's own participant entry.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    BasisPoints, EngineError, MoneyCents, SplitType,
    money::{BP_SCALE, PPM_SCALE},
};

/// One row of the split specification.
///
/// `value` is basis points of the bill for `SplitType::Percentage` and minor
/// units for `SplitType::Amount`. Repeated person ids accumulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitEntry {
    pub person_id: Uuid,
    pub value: i64,
}

impl SplitEntry {
    #[must_use]
    pub fn new(person_id: Uuid, value: i64) -> Self {
        Self { person_id, value }
    }
}

/// One participant's computed share, ready for persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Share {
    pub amount: MoneyCents,
    /// Basis points of the bill. For percentage splits this is the input
    /// value; for amount splits it is derived from the final amount (and so
    /// includes any absorbed remainder).
    pub percent_bp: BasisPoints,
    /// Parts-per-million of the bill.
    pub rate_ppm: i64,
}

/// Computes every participant's share of the bill.
///
/// Percentage values are applied with half-up rounding, so the computed
/// shares may overshoot the bill by at most one cent; a larger overshoot is a
/// caller error (`SplitExceedsTotal`). Any positive remainder goes to
/// `self_person_id`, whose entry is created if the splits never mentioned it.
///
/// The returned shares sum to the bill total, or to one cent above it in the
/// overshoot case.
pub fn compute_shares(
    bill_total: MoneyCents,
    split_type: SplitType,
    entries: &[SplitEntry],
    self_person_id: Uuid,
) -> Result<BTreeMap<Uuid, Share>, EngineError> {
    if !bill_total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "bill total must be > 0".to_string(),
        ));
    }

    let mut amounts: BTreeMap<Uuid, MoneyCents> = BTreeMap::new();
    let mut input_bp: BTreeMap<Uuid, BasisPoints> = BTreeMap::new();
    let mut sum = MoneyCents::ZERO;

    for entry in entries {
        if entry.value < 0 {
            return Err(EngineError::InvalidAmount(
                "split value must be non-negative".to_string(),
            ));
        }
        let amount = match split_type {
            SplitType::Percentage => bill_total.percent_of(entry.value),
            SplitType::Amount => MoneyCents::new(entry.value),
        };
        *amounts.entry(entry.person_id).or_default() += amount;
        *input_bp.entry(entry.person_id).or_insert(0) += entry.value;
        sum += amount;
    }

    let remainder = bill_total - sum;
    if remainder.cents() < -1 {
        return Err(EngineError::SplitExceedsTotal(format!(
            "splits sum to {sum}, bill total is {bill_total}"
        )));
    }
    if remainder.is_positive() {
        *amounts.entry(self_person_id).or_default() += remainder;
    } else {
        // Ensure the self entry exists even for a fully-split bill, so the
        // user always has a split row (possibly zero).
        amounts.entry(self_person_id).or_default();
    }

    let mut shares = BTreeMap::new();
    for (person_id, amount) in amounts {
        let (percent_bp, rate_ppm) = match split_type {
            SplitType::Percentage => {
                let bp = input_bp.get(&person_id).copied().unwrap_or(0);
                (bp, bp * (PPM_SCALE / BP_SCALE))
            }
            SplitType::Amount => (
                amount
                    .mul_div_round_half_up(BP_SCALE, bill_total.cents())
                    .cents(),
                amount
                    .mul_div_round_half_up(PPM_SCALE, bill_total.cents())
                    .cents(),
            ),
        };
        shares.insert(
            person_id,
            Share {
                amount,
                percent_bp,
                rate_ppm,
            },
        );
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(shares: &BTreeMap<Uuid, Share>) -> i64 {
        shares.values().map(|s| s.amount.cents()).sum()
    }

    #[test]
    fn percentage_split_assigns_remainder_to_self() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        // bill 100.00, P1 takes 40% → P1 40.00, self 60.00
        let shares = compute_shares(
            MoneyCents::new(10_000),
            SplitType::Percentage,
            &[SplitEntry::new(p1, 4000)],
            me,
        )
        .unwrap();

        assert_eq!(shares[&p1].amount.cents(), 4000);
        assert_eq!(shares[&p1].percent_bp, 4000);
        assert_eq!(shares[&me].amount.cents(), 6000);
        assert_eq!(total(&shares), 10_000);
    }

    #[test]
    fn empty_splits_give_everything_to_self() {
        let me = Uuid::new_v4();
        let shares =
            compute_shares(MoneyCents::new(5000), SplitType::Amount, &[], me).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[&me].amount.cents(), 5000);
        assert_eq!(shares[&me].percent_bp, 10_000);
        assert_eq!(shares[&me].rate_ppm, 1_000_000);
    }

    #[test]
    fn repeated_person_ids_accumulate() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        let shares = compute_shares(
            MoneyCents::new(9000),
            SplitType::Amount,
            &[SplitEntry::new(p1, 2000), SplitEntry::new(p1, 1000)],
            me,
        )
        .unwrap();
        assert_eq!(shares[&p1].amount.cents(), 3000);
        assert_eq!(shares[&me].amount.cents(), 6000);
    }

    #[test]
    fn splits_exceeding_total_fail() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        let err = compute_shares(
            MoneyCents::new(1000),
            SplitType::Amount,
            &[SplitEntry::new(p1, 1500)],
            me,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::SplitExceedsTotal(_)));
    }

    #[test]
    fn one_cent_rounding_overshoot_is_tolerated() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        // bill 99.99, two 50% shares each round to 50.00 → sum 100.00, one
        // cent over: allowed, self absorbs nothing.
        let shares = compute_shares(
            MoneyCents::new(9999),
            SplitType::Percentage,
            &[SplitEntry::new(p1, 5000), SplitEntry::new(p2, 5000)],
            me,
        )
        .unwrap();
        assert_eq!(shares[&p1].amount.cents(), 5000);
        assert_eq!(shares[&p2].amount.cents(), 5000);
        assert_eq!(shares[&me].amount.cents(), 0);
    }

    #[test]
    fn negative_split_value_fails() {
        let me = Uuid::new_v4();
        let err = compute_shares(
            MoneyCents::new(1000),
            SplitType::Amount,
            &[SplitEntry::new(me, -1)],
            me,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn amount_split_derives_percent_from_final_share() {
        let me = Uuid::new_v4();
        let p1 = Uuid::new_v4();
        // bill 90.00, P1 30.00 → P1 33.33%, self 66.67% (with remainder).
        let shares = compute_shares(
            MoneyCents::new(9000),
            SplitType::Amount,
            &[SplitEntry::new(p1, 3000)],
            me,
        )
        .unwrap();
        assert_eq!(shares[&p1].percent_bp, 3333);
        assert_eq!(shares[&me].percent_bp, 6667);
    }
}
