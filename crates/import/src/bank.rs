//! Checking-account activity export: a leading Details column (DEBIT/CREDIT),
//! a Posting Date, signed amounts, and the bank's own running balance.

use tideover_core::Money;
use tracing::debug;

use crate::statement::{column_index, parse_record_date, section_reader, usable_row, RawTransactionRecord};

pub(crate) fn parse_section(text: &str) -> (Vec<RawTransactionRecord>, usize) {
    let mut reader = section_reader(text);
    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(_) => return (Vec::new(), 0),
    };

    let details_col = column_index(&headers, "details");
    let date_col = column_index(&headers, "posting date");
    let desc_col = column_index(&headers, "description");
    let amount_col = column_index(&headers, "amount");
    let type_col = column_index(&headers, "type");
    let balance_col = column_index(&headers, "balance");

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
            debug!(row = ?row.get(desc_col), "skipping unusable bank row");
            skipped += 1;
            continue;
        };

        // Prefer the Type column; the Details flag is coarser but always there.
        let source_type = type_col
            .and_then(|c| row.get(c))
            .filter(|s| !s.trim().is_empty())
            .or_else(|| details_col.and_then(|c| row.get(c)))
            .unwrap_or_default()
            .trim()
            .to_string();

        let balance = balance_col
            .and_then(|c| row.get(c))
            .and_then(Money::parse_statement_amount);

        records.push(RawTransactionRecord {
            description: row.get(desc_col).unwrap_or_default().trim().to_string(),
            date,
            amount,
            source_type,
            balance,
            category_hint: None,
        });
    }

    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SECTION: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,06/10/2026,POS PURCHASE COFFEE SHOP,-4.50,ACH_DEBIT,995.50,
CREDIT,06/09/2026,\"ORIG CO NAME:BRIGHTWAY REALTY ORIG ID:123\",2500.00,ACH_CREDIT,1000.00,
DEBIT,06/08/2026,\"AMAZON, INC PURCHASE\",-25.00,DEBIT_CARD,,";

    #[test]
    fn parses_signed_amounts_and_balance() {
        let (records, skipped) = parse_section(SECTION);
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, Money::from_cents(-450));
        assert_eq!(records[0].balance, Some(Money::from_cents(99550)));
        assert_eq!(records[0].source_type, "ACH_DEBIT");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2026, 6, 10).unwrap());
        assert_eq!(records[1].amount, Money::from_cents(250_000));
    }

    #[test]
    fn quoted_commas_stay_inside_fields() {
        let (records, _) = parse_section(SECTION);
        assert_eq!(records[2].description, "AMAZON, INC PURCHASE");
        assert_eq!(records[2].balance, None);
    }

    #[test]
    fn rows_without_date_or_amount_are_skipped() {
        let text = "\
Details,Posting Date,Description,Amount,Type,Balance
DEBIT,,PENDING HOLD,-10.00,ACH_DEBIT,
DEBIT,06/10/2026,ZERO ADJUSTMENT,0.00,FEE,
DEBIT,06/10/2026,REAL ROW,-10.00,ACH_DEBIT,985.50";
        let (records, skipped) = parse_section(text);
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 2);
        assert_eq!(records[0].description, "REAL ROW");
    }

    #[test]
    fn falls_back_to_details_when_type_is_empty() {
        let text = "\
Details,Posting Date,Description,Amount,Type,Balance
DEBIT,06/10/2026,NO TYPE ROW,-10.00,,985.50";
        let (records, _) = parse_section(text);
        assert_eq!(records[0].source_type, "DEBIT");
    }
}
