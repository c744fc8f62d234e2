mod bank;
mod card;
mod ledger;

pub mod export;
pub mod matcher;
pub mod processor;
pub mod recurring;
pub mod rules;
pub mod statement;
pub mod vendor;

pub use export::write_table;
pub use matcher::resolve_bills;
pub use processor::{ProcessorOptions, TransactionProcessor};
pub use recurring::Cadence;
pub use rules::{CategoryRule, CategoryRuleSet};
pub use statement::{ParseOutcome, RawTransactionRecord, StatementFormat};
pub use vendor::VendorNormalizer;

use tideover_core::Transaction;

/// Parse raw export text (possibly several pasted-together sections).
pub fn parse_statements(text: &str) -> ParseOutcome {
    statement::parse(text)
}

/// Full intake path: parse the text and process the surviving rows into
/// canonical transactions. Returns the batch plus the skipped-row count.
pub fn ingest(
    text: &str,
    processor: &TransactionProcessor,
    options: &ProcessorOptions,
) -> (Vec<Transaction>, usize) {
    let outcome = statement::parse(text);
    let transactions = processor.process(&outcome.records, options);
    (transactions, outcome.skipped)
}
