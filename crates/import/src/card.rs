//! Card activity export: Transaction Date / Post Date pairs, the issuer's
//! Category column, and signed amounts (purchases negative).

use tideover_core::Money;
use tracing::debug;

use crate::statement::{column_index, parse_record_date, section_reader, usable_row, RawTransactionRecord};

pub(crate) fn parse_section(text: &str) -> (Vec<RawTransactionRecord>, usize) {
    let mut reader = section_reader(text);
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(_) => return (Vec::new(), 0),
    };

    // The transaction date is when the obligation was incurred; the post
    // date is settlement noise and only breaks recurrence gap math.
    let date_col = column_index(&headers, "transaction date");
    let desc_col = column_index(&headers, "description");
    let amount_col = column_index(&headers, "amount");
    let type_col = column_index(&headers, "type");
    let category_col = column_index(&headers, "category");

    let (Some(date_col), Some(desc_col), Some(amount_col)) = (date_col, desc_col, amount_col)
    else {
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
        let amount = row.get(amount_col).and_then(Money::parse_statement_amount);
        let Some((date, amount)) = usable_row(date, amount) else {
            debug!(row = ?row.get(desc_col), "skipping unusable card row");
            skipped += 1;
            continue;
        };

        let category_hint = category_col
            .and_then(|c| row.get(c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        records.push(RawTransactionRecord {
            description: row.get(desc_col).unwrap_or_default().trim().to_string(),
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
