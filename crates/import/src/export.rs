//! Flat delimited export of processed transactions, for round-tripping with
//! spreadsheet tools.

use thiserror::Error;
use tideover_core::{Money, Transaction};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

const HEADER: &[&str] = &[
    "date",
    "description",
    "amount",
    "type",
    "recurring",
    "category",
    "pay_period_impact",
    "running_balance",
];

/// Write the batch as a delimited table, newest-first as given.
pub fn write_table(transactions: &[Transaction]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for tx in transactions {
        writer.write_record(&[
            tx.date.format("%Y-%m-%d").to_string(),
            tx.description.clone(),
            plain_amount(tx.amount),
            tx.source_type.clone(),
            tx.is_recurring.to_string(),
            tx.category.to_string(),
            tx.pay_period_impact.to_string(),
            plain_amount(tx.running_balance),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// `-4.50`, not `-$4.50` — spreadsheets want bare numbers.
fn plain_amount(money: Money) -> String {
    let cents = money.to_cents();
    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", (cents / 100).abs(), (cents % 100).abs())
}
