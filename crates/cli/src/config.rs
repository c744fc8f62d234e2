//! The `tideover.toml` config: balances, declared bills, expected
//! commissions, extra holidays, and optional custom category rules.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use tideover_core::{Bill, BillKind, Category, HolidayTable, Money, PendingCommission};
use tideover_import::CategoryRule;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Balance before the oldest transaction in the export.
    #[serde(default)]
    pub starting_balance: f64,
    /// Balance right now, for the projection.
    #[serde(default)]
    pub current_balance: f64,
    /// Literal extra holiday dates on top of the generated federal table.
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub bills: Vec<BillEntry>,
    #[serde(default)]
    pub commissions: Vec<CommissionEntry>,
    /// Custom category rules, evaluated before the builtin table.
    #[serde(default)]
    pub rules: Vec<CategoryRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillEntry {
    pub vendor: String,
    pub amount: f64,
    pub due_day: u32,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_kind")]
    pub kind: BillKind,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommissionEntry {
    pub amount: f64,
    pub expected_date: NaiveDate,
    #[serde(default)]
    pub cutoff_label: String,
}

fn default_category() -> Category {
    Category::Miscellaneous
}

fn default_true() -> bool {
    true
}

fn default_kind() -> BillKind {
    BillKind::Recurring
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn bills(&self) -> Vec<Bill> {
        self.bills
            .iter()
            .enumerate()
            .map(|(i, b)| Bill {
                id: format!("bill-{}-{}", i + 1, slug(&b.vendor)),
                vendor: b.vendor.clone(),
                amount: Money::from_dollars(b.amount),
                due_day: b.due_day,
                category: b.category,
                active: b.active,
                kind: b.kind,
            })
            .collect()
    }

    pub fn commissions(&self) -> Vec<PendingCommission> {
        self.commissions
            .iter()
            .map(|c| PendingCommission {
                amount: Money::from_dollars(c.amount),
                expected_date: c.expected_date,
                cutoff_label: c.cutoff_label.clone(),
            })
            .collect()
    }

    /// Generated federal table spanning the reference year, plus any literal
    /// extras from the config.
    pub fn holiday_table(&self, as_of: NaiveDate) -> HolidayTable {
        use chrono::Datelike;
        let year = as_of.year();
        let mut table = HolidayTable::us_federal(year - 1..=year + 2);
        for &d in &self.holidays {
            table.insert(d);
        }
        table
    }
}

fn slug(vendor: &str) -> String {
    vendor
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
