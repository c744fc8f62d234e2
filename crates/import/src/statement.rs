use chrono::{Datelike, NaiveDate};
use tideover_core::Money;
use tracing::debug;

use crate::{bank, card, ledger};

/// One row from an export, in a uniform shape regardless of source format.
/// Transient — discarded once the processor has built real transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransactionRecord {
    pub description: String,
    pub date: NaiveDate,
    /// Negative = expense, positive = income, as the source encodes it.
    pub amount: Money,
    /// The source's type label (ACH_DEBIT, Sale, Deposit, ...).
    pub source_type: String,
    /// Running balance as reported by the source, when it reports one.
    pub balance: Option<Money>,
    /// The source's own category/account label, for hint-first classification.
    pub category_hint: Option<String>,
}

/// The three recognized export shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFormat {
    /// Checking-account activity: leading Details column, a Posting Date,
    /// signed amounts, and the bank's own running balance.
    BankActivity,
    /// Card activity: Transaction Date / Post Date pairs and a Category
    /// column from the issuer.
    CardActivity,
    /// Accounting-software export: Transaction Type and Account Name
    /// columns, amounts quoted with comma thousands separators.
    LedgerExport,
}

impl StatementFormat {
    /// Match a line against the three header signatures.
    pub fn detect(line: &str) -> Option<StatementFormat> {
        let h = line.trim().to_lowercase();
        if h.starts_with("details") && h.contains("posting date") {
            Some(StatementFormat::BankActivity)
        } else if h.contains("transaction date") && h.contains("post date") && h.contains("amount")
        {
            Some(StatementFormat::CardActivity)
        } else if h.contains("transaction type") && h.contains("account name") {
            Some(StatementFormat::LedgerExport)
        } else {
            None
        }
    }
}

/// A contiguous run of lines under one recognized header.
#[derive(Debug, Clone)]
pub struct Section {
    pub format: StatementFormat,
    /// Header line plus data lines, ready for a csv reader.
    pub text: String,
}

/// Split possibly concatenated export text into per-format sections.
///
/// Users paste several exports into one file; every line matching a header
/// signature starts a new section. Lines before the first recognized header
/// are ignored.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(StatementFormat, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(format) = StatementFormat::detect(line) {
            if let Some((fmt, lines)) = current.take() {
                sections.push(Section { format: fmt, text: lines.join("\n") });
            }
            current = Some((format, vec![line]));
        } else if let Some((_, ref mut lines)) = current {
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
    }
    if let Some((fmt, lines)) = current {
        sections.push(Section { format: fmt, text: lines.join("\n") });
    }
    sections
}

/// Result of parsing a file: the good rows, and how many were dropped.
/// Empty or unrecognized input is an empty outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<RawTransactionRecord>,
    pub skipped: usize,
}

/// Parse full export text, tolerating merged multi-section files.
pub fn parse(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    for section in split_sections(text) {
        let (records, skipped) = match section.format {
            StatementFormat::BankActivity => bank::parse_section(&section.text),
            StatementFormat::CardActivity => card::parse_section(&section.text),
            StatementFormat::LedgerExport => ledger::parse_section(&section.text),
        };
        debug!(
            format = ?section.format,
            rows = records.len(),
            skipped,
            "parsed statement section"
        );
        outcome.records.extend(records);
        outcome.skipped += skipped;
    }
    outcome
}

/// Dates as the exports actually print them, most common first.
pub(crate) fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"] {
        // %Y happily parses 2-digit years as year 26; let %y handle those.
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if d.year() >= 1970 {
                return Some(d);
            }
        }
    }
    None
}

/// Find a column by case-insensitive name, preferring exact matches over
/// substring hits ("Type" before "Transaction Type").
pub(crate) fn column_index(headers: &csv::StringRecord, needle: &str) -> Option<usize> {
    let needle = needle.to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == needle)
        .or_else(|| {
            headers
                .iter()
                .position(|h| h.trim().to_lowercase().contains(&needle))
        })
}

/// A csv reader over one section's text, quote-aware and tolerant of ragged
/// row lengths. Never split on commas by hand — quoted fields contain them.
pub(crate) fn section_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Shared per-row gate: rows with no usable date or a zero amount are noise
/// (section totals, pending placeholders) and are dropped.
pub(crate) fn usable_row(date: Option<NaiveDate>, amount: Option<Money>) -> Option<(NaiveDate, Money)> {
    match (date, amount) {
        (Some(d), Some(a)) if !a.is_zero() => Some((d, a)),
        _ => None,
    }
}
