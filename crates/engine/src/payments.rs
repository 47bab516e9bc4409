//! Payment aggregation: turns the paid-by list into per-participant totals
//! and validates them against the bill.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{EngineError, MoneyCents};

/// One row of the paid-by list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaidByEntry {
    pub person_id: Uuid,
    pub amount: MoneyCents,
}

impl PaidByEntry {
    #[must_use]
    pub fn new(person_id: Uuid, amount: MoneyCents) -> Self {
        Self { person_id, amount }
    }
}

/// Accumulates the paid-by list into a per-participant map.
///
/// The payments must cover the bill: a discrepancy of more than one cent in
/// either direction is a `PaidSumMismatch` (one cent of slack is accepted
/// because paid entries come straight from user input).
pub fn aggregate_payments(
    bill_total: MoneyCents,
    entries: &[PaidByEntry],
) -> Result<BTreeMap<Uuid, MoneyCents>, EngineError> {
    if entries.is_empty() {
        return Err(EngineError::InvalidInput(
            "paid_by must not be empty".to_string(),
        ));
    }

    let mut paid: BTreeMap<Uuid, MoneyCents> = BTreeMap::new();
    let mut sum = MoneyCents::ZERO;
    for entry in entries {
        if entry.amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "paid amount must be non-negative".to_string(),
            ));
        }
        *paid.entry(entry.person_id).or_default() += entry.amount;
        sum += entry.amount;
    }

    if (sum - bill_total).cents().abs() > 1 {
        return Err(EngineError::PaidSumMismatch(format!(
            "payments sum to {sum}, bill total is {bill_total}"
        )));
    }

    Ok(paid)
}
