use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bill::{Bill, BillResolutionStatus, PendingCommission};
use crate::money::Money;
use crate::schedule::DateRange;

/// Everything the projection needs, gathered by the caller. Pure input —
/// the engine holds no state of its own.
#[derive(Debug, Clone)]
pub struct ProjectionInputs<'a> {
    pub current_balance: Money,
    /// Active bills whose due date falls in [today, next payday].
    pub bills_in_window: Vec<&'a Bill>,
    pub resolutions: &'a [BillResolutionStatus],
    pub commission: Option<&'a PendingCommission>,
    pub today: NaiveDate,
}

/// The safe-to-spend picture before the next deposit. Recomputed on every
/// call; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    /// Sum of unresolved bills due before the next payday.
    pub amount_to_keep: Money,
    /// Current balance, plus a commission that lands today.
    pub liquidity_balance: Money,
    pub safe_to_spend: Money,
    /// Safe-to-spend plus a future-dated commission.
    pub projected_balance: Money,
    /// How much of `amount_to_keep` the liquidity covers, 0–100.
    pub coverage_percent: i64,
    pub shortfall: Money,
    pub is_short: bool,
}

/// Active bills due between `today` and `payday`, inclusive on both ends.
/// The window may straddle a month boundary, so each bill's due day is
/// resolved against every month the window touches.
pub fn bills_due_in_window<'a>(
    bills: &'a [Bill],
    today: NaiveDate,
    payday: NaiveDate,
) -> Vec<&'a Bill> {
    let window = DateRange::new(today, payday);
    let mut months = vec![(today.year(), today.month())];
    if (payday.year(), payday.month()) != (today.year(), today.month()) {
        months.push((payday.year(), payday.month()));
    }
    bills
        .iter()
        .filter(|b| b.active)
        .filter(|b| {
            months
                .iter()
                .any(|&(y, m)| window.contains(b.due_date_in(y, m)))
        })
        .collect()
}

pub fn project(inputs: &ProjectionInputs<'_>) -> FinancialProjection {
    let resolved_ids: HashSet<&str> = inputs
        .resolutions
        .iter()
        .filter(|r| r.resolved)
        .map(|r| r.bill_id.as_str())
        .collect();

    // Resolved bills are presumed already paid out of the balance.
    let amount_to_keep: Money = inputs
        .bills_in_window
        .iter()
        .filter(|b| !resolved_ids.contains(b.id.as_str()))
        .map(|b| b.amount)
        .sum();

    // A commission landing today is real liquidity; a future one is not.
    let commission_amount = inputs.commission.map(|c| c.amount).unwrap_or_else(Money::zero);
    let folded_today = inputs
        .commission
        .is_some_and(|c| c.expected_date == inputs.today);

    let liquidity_balance = if folded_today {
        inputs.current_balance + commission_amount
    } else {
        inputs.current_balance
    };

    let safe_to_spend = liquidity_balance - amount_to_keep;

    // Folded commissions must not count twice.
    let commission_for_projection = if folded_today || inputs.commission.is_none() {
        Money::zero()
    } else {
        commission_amount
    };

    let projected_balance = safe_to_spend + commission_for_projection;
    let shortfall = (amount_to_keep - liquidity_balance).max(Money::zero());

    FinancialProjection {
        amount_to_keep,
        liquidity_balance,
        safe_to_spend,
        projected_balance,
        coverage_percent: liquidity_balance.percent_of(amount_to_keep),
        shortfall,
        is_short: shortfall.is_positive(),
    }
}
