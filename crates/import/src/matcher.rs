//! Bill-to-transaction resolution: did the month's spending already cover a
//! declared bill, and if so which transaction was it?

use chrono::Datelike;
use std::collections::HashMap;

use tideover_core::{Bill, BillResolutionStatus, Transaction};

use crate::vendor::VendorNormalizer;

/// Resolve each active bill against one calendar month of spending.
///
/// Bills match independently: a transaction is never consumed, so two bills
/// from the same vendor can both resolve to the same charge. Ambiguity on
/// amount distance is settled by input order — first seen wins.
pub fn resolve_bills(
    bills: &[Bill],
    transactions: &[Transaction],
    year: i32,
    month: u32,
    normalizer: &VendorNormalizer,
) -> Vec<BillResolutionStatus> {
    // Expense-equivalent rows only: negative, or positive under a
    // "debit"-flavored type label.
    let mut by_vendor: HashMap<String, Vec<&Transaction>> = HashMap::new();
    for tx in transactions {
        if tx.date.year() == year && tx.date.month() == month && tx.expense_like() {
            by_vendor
                .entry(normalizer.key(&tx.description))
                .or_default()
                .push(tx);
        }
    }

    bills
        .iter()
        .filter(|b| b.active)
        .map(|bill| {
            let key = normalizer.key(&bill.vendor);
            match by_vendor.get(&key).and_then(|g| closest_by_amount(g, bill)) {
                Some(tx) => BillResolutionStatus {
                    bill_id: bill.id.clone(),
                    resolved: true,
                    transaction_id: Some(tx.id.clone()),
                    transaction_date: Some(tx.date),
                    matched_amount: Some(tx.amount),
                },
                None => BillResolutionStatus::unresolved(&bill.id),
            }
        })
        .collect()
}

fn closest_by_amount<'a>(group: &[&'a Transaction], bill: &Bill) -> Option<&'a Transaction> {
    let target = bill.amount.abs().to_cents();
    let mut best: Option<(&Transaction, i64)> = None;
    for tx in group {
        let distance = (tx.amount.abs().to_cents() - target).abs();
        // Strict less-than keeps the first-encountered on ties.
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((tx, distance));
        }
    }
    best.map(|(tx, _)| tx)
}
