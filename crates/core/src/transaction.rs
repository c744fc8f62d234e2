use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::money::Money;

/// Closed set of spending categories for a commission-paid contractor's
/// books. `Miscellaneous` is the fallback when nothing else matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Fuel,
    Travel,
    LegalAccounting,
    OfficeSupplies,
    Software,
    Repairs,
    PostageShipping,
    TaxesLicenses,
    Insurance,
    Subscriptions,
    Sales,
    OwnerContribution,
    OwnerDistribution,
    Transfers,
    Fees,
    Miscellaneous,
}

impl Category {
    /// Money coming into the business rather than leaving it.
    pub fn is_income(self) -> bool {
        matches!(self, Category::Sales | Category::OwnerContribution)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Fuel => "Fuel",
            Category::Travel => "Travel",
            Category::LegalAccounting => "Legal & Accounting",
            Category::OfficeSupplies => "Office Supplies",
            Category::Software => "Software",
            Category::Repairs => "Repairs & Maintenance",
            Category::PostageShipping => "Postage & Shipping",
            Category::TaxesLicenses => "Taxes & Licenses",
            Category::Insurance => "Insurance",
            Category::Subscriptions => "Subscriptions",
            Category::Sales => "Sales",
            Category::OwnerContribution => "Owner's Contribution",
            Category::OwnerDistribution => "Owner's Distribution",
            Category::Transfers => "Transfers",
            Category::Fees => "Fees",
            Category::Miscellaneous => "Miscellaneous",
        };
        write!(f, "{label}")
    }
}

/// The canonical processed transaction. Built in bulk by the processor and
/// immutable afterward; user edits live in an [`OverrideLayer`], never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable content digest — identical source rows reproduce identical ids
    /// across re-ingestion, which is what keeps override entries attached.
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Negative = expense, positive = income.
    pub amount: Money,
    /// The export's own type label (ACH_DEBIT, Sale, Check, ...).
    pub source_type: String,
    pub category: Category,
    pub is_recurring: bool,
    /// Cumulative balance, accumulated oldest-to-newest from the caller's
    /// starting balance.
    pub running_balance: Money,
    /// Whether the date falls inside the caller's current pay window.
    pub pay_period_impact: bool,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    /// Expense for matching purposes. Some exports encode expenses as
    /// positive amounts under a "debit"-flavored type label.
    pub fn expense_like(&self) -> bool {
        self.amount.is_negative()
            || (self.amount.is_positive() && self.source_type.to_lowercase().contains("debit"))
    }
}

/// A user edit to one transaction: only the two overridable fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub category: Option<Category>,
    pub is_recurring: Option<bool>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.is_recurring.is_none()
    }
}

/// Sparse patch layer keyed by stable transaction id.
///
/// Transactions are rebuilt wholesale on every ingestion, so edits are never
/// written into them; the layer is merged onto the fresh batch at read time.
/// Ids are pure functions of row content, which is what lets a patch survive
/// re-ingestion of the same file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideLayer {
    patches: HashMap<String, TransactionPatch>,
}

impl OverrideLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_category(&mut self, id: &str, category: Category) {
        self.patches.entry(id.to_string()).or_default().category = Some(category);
    }

    pub fn set_recurring(&mut self, id: &str, is_recurring: bool) {
        self.patches.entry(id.to_string()).or_default().is_recurring = Some(is_recurring);
    }

    pub fn clear(&mut self, id: &str) {
        self.patches.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<&TransactionPatch> {
        self.patches.get(id)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Merge the layer onto a freshly computed batch.
    pub fn apply(&self, transactions: &mut [Transaction]) {
        if self.patches.is_empty() {
            return;
        }
        for tx in transactions {
            if let Some(patch) = self.patches.get(&tx.id) {
                if let Some(category) = patch.category {
                    tx.category = category;
                }
                if let Some(recurring) = patch.is_recurring {
                    tx.is_recurring = recurring;
                }
            }
        }
    }
}
