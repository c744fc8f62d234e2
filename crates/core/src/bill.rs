use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::money::Money;
use crate::transaction::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillKind {
    Recurring,
    OneTime,
}

/// A user-declared obligation. Consumed read-only by the matcher and the
/// projection; creating/editing/storing these is the host's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub vendor: String,
    pub amount: Money,
    /// Nominal day of month, 1–31; clamped to the month's real length.
    pub due_day: u32,
    pub category: Category,
    pub active: bool,
    pub kind: BillKind,
}

impl Bill {
    /// The bill's concrete due date in a given month. A due day past the end
    /// of a short month clamps to its last day.
    pub fn due_date_in(&self, year: i32, month: u32) -> NaiveDate {
        calendar::clamp_day_to_month(year, month, self.due_day)
    }
}

/// One expected commission deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCommission {
    pub amount: Money,
    pub expected_date: NaiveDate,
    /// Free-text label for the cutoff this deposit settles.
    pub cutoff_label: String,
}

/// The single "next" commission: the earliest entry expected today or later.
pub fn next_commission(
    commissions: &[PendingCommission],
    today: NaiveDate,
) -> Option<&PendingCommission> {
    commissions
        .iter()
        .filter(|c| c.expected_date >= today)
        .min_by_key(|c| c.expected_date)
}

/// Whether a declared bill was seen in the month's spending, and where.
/// Recomputed on every call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillResolutionStatus {
    pub bill_id: String,
    pub resolved: bool,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub matched_amount: Option<Money>,
}

impl BillResolutionStatus {
    pub fn unresolved(bill_id: &str) -> Self {
        BillResolutionStatus {
            bill_id: bill_id.to_string(),
            resolved: false,
            transaction_id: None,
            transaction_date: None,
            matched_amount: None,
        }
    }
}
