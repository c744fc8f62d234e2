//! Accounting-software export: Transaction Type and Account Name columns,
//! amounts quoted with comma thousands separators. The Account Name column
//! rides along as a category hint for the rule table.

use tideover_core::Money;
use tracing::debug;

use crate::statement::{column_index, parse_record_date, section_reader, usable_row, RawTransactionRecord};

pub(crate) fn parse_section(text: &str) -> (Vec<RawTransactionRecord>, usize) {
    let mut reader = section_reader(text);
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(_) => return (Vec::new(), 0),
    };

    let date_col = column_index(&headers, "date");
    let type_col = column_index(&headers, "transaction type");
    let account_col = column_index(&headers, "account name");
    let amount_col = column_index(&headers, "amount");
    // Exports label the narration column inconsistently.
    let desc_col = column_index(&headers, "memo/description")
        .or_else(|| column_index(&headers, "description"))
        .or_else(|| column_index(&headers, "memo"))
        .or_else(|| column_index(&headers, "name"));

    let (Some(date_col), Some(amount_col)) = (date_col, amount_col) else {
        return (Vec::new(), 0);
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let date = row.get(date_col).and_then(parse_record_date);
        // Quoted "1,234.56" strings — the quote-aware reader has already
        // stripped the quotes; the comma handling lives in Money.
        let amount = row.get(amount_col).and_then(Money::parse_statement_amount);
        let Some((date, amount)) = usable_row(date, amount) else {
            debug!(row = ?row.get(date_col), "skipping unusable ledger row");
            skipped += 1;
            continue;
        };

        let category_hint = account_col
            .and_then(|c| row.get(c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        records.push(RawTransactionRecord {
            description: desc_col
                .and_then(|c| row.get(c))
                .unwrap_or_default()
                .trim()
                .to_string(),
            date,
            amount,
            source_type: type_col
                .and_then(|c| row.get(c))
                .unwrap_or_default()
                .trim()
                .to_string(),
            balance: None,
            category_hint,
        });
    }

    (records, skipped)
}
