//! Turns raw statement records into canonical transactions: deterministic
//! order, stable identity, category, recurrence, running balance, and the
//! pay-window flag.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

use tideover_core::{calendar::HolidayTable, schedule, Money, Transaction};

use crate::recurring::{self, VendorGroupEntry};
use crate::rules::CategoryRuleSet;
use crate::statement::RawTransactionRecord;
use crate::vendor::VendorNormalizer;

/// Per-run inputs. `today` is injected so every date-sensitive rule is
/// testable with a fixed clock; only the outermost caller should reach for
/// the real one.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub starting_balance: Money,
    pub today: NaiveDate,
    pub holidays: HolidayTable,
}

pub struct TransactionProcessor {
    normalizer: VendorNormalizer,
    rules: CategoryRuleSet,
}

impl Default for TransactionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionProcessor {
    pub fn new() -> Self {
        TransactionProcessor {
            normalizer: VendorNormalizer::new(),
            rules: CategoryRuleSet::builtin(),
        }
    }

    pub fn with_rules(rules: CategoryRuleSet) -> Self {
        TransactionProcessor { normalizer: VendorNormalizer::new(), rules }
    }

    pub fn normalizer(&self) -> &VendorNormalizer {
        &self.normalizer
    }

    /// Process a batch. Output is newest-first with deterministic tie-breaks,
    /// so re-running over identical input reproduces ids and order exactly.
    pub fn process(
        &self,
        records: &[RawTransactionRecord],
        options: &ProcessorOptions,
    ) -> Vec<Transaction> {
        let mut sorted: Vec<&RawTransactionRecord> = records.iter().collect();
        // Newest first; same-day rows ordered by content so duplicates keep
        // a stable relative position run over run.
        sorted.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.amount.to_cents().cmp(&b.amount.to_cents()))
                .then_with(|| a.source_type.cmp(&b.source_type))
        });

        // Occurrence counters scoped to rows identical in every hashed field:
        // true duplicates get distinct, order-stable ids.
        let mut occurrences: HashMap<String, u32> = HashMap::new();
        let pay_window = schedule::current_pay_window(options.today, &options.holidays);

        let mut transactions: Vec<Transaction> = sorted
            .iter()
            .map(|record| {
                let fingerprint = record_fingerprint(record);
                let occurrence = occurrences.entry(fingerprint.clone()).or_insert(0);
                let id = stable_id(&fingerprint, *occurrence);
                *occurrence += 1;

                Transaction {
                    id,
                    date: record.date,
                    description: record.description.clone(),
                    amount: record.amount,
                    source_type: record.source_type.clone(),
                    category: self.rules.classify(
                        &record.description,
                        record.category_hint.as_deref(),
                        record.amount,
                        &record.source_type,
                    ),
                    is_recurring: false,
                    running_balance: Money::zero(),
                    pay_period_impact: pay_window.contains_half_open(record.date),
                }
            })
            .collect();

        self.flag_recurring(&mut transactions);
        apply_running_balance(&mut transactions, options.starting_balance);

        debug!(count = transactions.len(), "processed transaction batch");
        transactions
    }

    fn flag_recurring(&self, transactions: &mut [Transaction]) {
        let entries: Vec<VendorGroupEntry> = transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| VendorGroupEntry {
                index,
                date: tx.date,
                amount: tx.amount,
                vendor_key: self.normalizer.key(&tx.description),
            })
            .collect();
        for index in recurring::recurring_indices(&entries) {
            transactions[index].is_recurring = true;
        }
    }
}

/// Everything identity depends on, pre-joined so the occurrence map and the
/// hash agree on what "identical" means.
fn record_fingerprint(record: &RawTransactionRecord) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        record.date,
        record.amount.to_cents(),
        record.source_type,
        record.description,
        record.category_hint.as_deref().unwrap_or("")
    )
}

fn stable_id(fingerprint: &str, occurrence: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(b"|");
    hasher.update(occurrence.to_string().as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Walk oldest-to-newest accumulating amounts onto the starting balance.
/// The slice is newest-first, so iterate from the back.
fn apply_running_balance(transactions: &mut [Transaction], starting_balance: Money) {
    let mut balance = starting_balance;
    for tx in transactions.iter_mut().rev() {
        balance = balance + tx.amount;
        tx.running_balance = balance;
    }
}
