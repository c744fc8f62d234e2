//! End-to-end flows: merged export text in, projection out.

use chrono::NaiveDate;
use tideover_core::{
    bill::next_commission,
    projection::{self, ProjectionInputs},
    schedule, Bill, BillKind, Category, HolidayTable, Money, OverrideLayer, PendingCommission,
};
use tideover_import::{
    ingest, matcher, parse_statements, write_table, ProcessorOptions, TransactionProcessor,
    VendorNormalizer,
};

const MERGED_EXPORT: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,06/05/2026,INTERNET CO 800-555-0100,-50.00,ACH_DEBIT,1150.00,
DEBIT,06/03/2026,POS DEBIT FUEL STOP #4411,-38.12,DEBIT_CARD,1200.00,
CREDIT,06/04/2026,ORIG CO NAME:BRIGHTWAY REALTY ORIG ID:9001 DESC:COMMISSION,2500.00,ACH_CREDIT,1238.12,
Transaction Date,Post Date,Description,Category,Type,Amount,Memo
05/28/2026,05/29/2026,CLOUD HOSTING LLC,Professional Services,Sale,-20.00,
Date,Transaction Type,Num,Name,Memo/Description,Account Name,Amount
05/20/2026,Expense,101,State Farm,Auto policy,Insurance,\"-1,250.00\"
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn options(today: NaiveDate) -> ProcessorOptions {
    ProcessorOptions {
        starting_balance: Money::from_cents(250_000),
        today,
        holidays: HolidayTable::default(),
    }
}

fn bill(id: &str, vendor: &str, cents: i64, due_day: u32) -> Bill {
    Bill {
        id: id.to_string(),
        vendor: vendor.to_string(),
        amount: Money::from_cents(cents),
        due_day,
        category: Category::Subscriptions,
        active: true,
        kind: BillKind::Recurring,
    }
}

#[test]
fn merged_file_parses_all_three_sections() {
    let outcome = parse_statements(MERGED_EXPORT);
    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.skipped, 0);
    // The ledger row decoded its quoted comma-thousands amount.
    assert!(outcome
        .records
        .iter()
        .any(|r| r.amount == Money::from_cents(-125_000)));
}

#[test]
fn reingestion_is_deterministic_bit_for_bit() {
    let processor = TransactionProcessor::new();
    let opts = options(date(2026, 6, 10));
    let (first, _) = ingest(MERGED_EXPORT, &processor, &opts);
    let (second, _) = ingest(MERGED_EXPORT, &processor, &opts);
    assert_eq!(first, second);
    let ids: Vec<&str> = first.iter().map(|t| t.id.as_str()).collect();
    let ids_again: Vec<&str> = second.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ids_again);
}

#[test]
fn running_balance_invariant_holds_across_formats() {
    let processor = TransactionProcessor::new();
    let (txs, _) = ingest(MERGED_EXPORT, &processor, &options(date(2026, 6, 10)));
    // Newest-first output; walk oldest-first and recompute.
    let mut expected = Money::from_cents(250_000);
    for tx in txs.iter().rev() {
        expected = expected + tx.amount;
        assert_eq!(tx.running_balance, expected, "{}", tx.description);
    }
}

#[test]
fn overrides_survive_reingestion_via_stable_ids() {
    let processor = TransactionProcessor::new();
    let opts = options(date(2026, 6, 10));
    let (txs, _) = ingest(MERGED_EXPORT, &processor, &opts);
    let internet = txs.iter().find(|t| t.description.contains("INTERNET")).unwrap();

    let mut layer = OverrideLayer::new();
    layer.set_category(&internet.id, Category::Software);

    // Fresh ingestion, same bytes: the patch still lands.
    let (mut fresh, _) = ingest(MERGED_EXPORT, &processor, &opts);
    layer.apply(&mut fresh);
    let patched = fresh.iter().find(|t| t.description.contains("INTERNET")).unwrap();
    assert_eq!(patched.category, Category::Software);
}

#[test]
fn resolved_bill_is_excluded_from_amount_to_keep() {
    let today = date(2026, 6, 1);
    let processor = TransactionProcessor::new();
    let (txs, _) = ingest(MERGED_EXPORT, &processor, &options(today));

    // $50 internet bill due the 5th; the June 5 INTERNET CO charge covers it.
    let bills = vec![bill("internet", "Internet Co", 5_000, 5)];
    let normalizer = VendorNormalizer::new();
    let resolutions = matcher::resolve_bills(&bills, &txs, 2026, 6, &normalizer);
    assert!(resolutions[0].resolved);

    let payday = schedule::next_payment(today, &HolidayTable::default());
    assert_eq!(payday.payment_date, date(2026, 6, 19));
    let in_window = projection::bills_due_in_window(&bills, today, payday.payment_date);
    assert_eq!(in_window.len(), 1, "due date is in-window even though resolved");

    let projection = projection::project(&ProjectionInputs {
        current_balance: Money::from_cents(100_000),
        bills_in_window: in_window,
        resolutions: &resolutions,
        commission: None,
        today,
    });
    assert_eq!(projection.amount_to_keep, Money::zero());
    assert_eq!(projection.safe_to_spend, Money::from_cents(100_000));
}

#[test]
fn shortfall_scenario_from_unresolved_bills() {
    let today = date(2026, 6, 1);
    // $200 on hand, $350 of bills due before the June 19 payday, nothing
    // resolved, no commission.
    let bills = vec![
        bill("rent-storage", "Lockbox Storage", 20_000, 10),
        bill("van-insurance", "Ridgeline Insurance", 15_000, 15),
    ];
    let in_window = projection::bills_due_in_window(&bills, today, date(2026, 6, 19));
    assert_eq!(in_window.len(), 2);

    let projection = projection::project(&ProjectionInputs {
        current_balance: Money::from_cents(20_000),
        bills_in_window: in_window,
        resolutions: &[],
        commission: None,
        today,
    });
    assert_eq!(projection.shortfall, Money::from_cents(15_000));
    assert!(projection.is_short);
    assert_eq!(projection.coverage_percent, 57);
}

#[test]
fn same_day_commission_folds_into_liquidity_not_projection() {
    let today = date(2026, 6, 1);
    let commissions = vec![
        PendingCommission {
            amount: Money::from_cents(100_000),
            expected_date: today,
            cutoff_label: "May 16-31".to_string(),
        },
        PendingCommission {
            amount: Money::from_cents(90_000),
            expected_date: date(2026, 6, 19),
            cutoff_label: "Jun 1-15".to_string(),
        },
    ];
    let next = next_commission(&commissions, today).unwrap();
    assert_eq!(next.expected_date, today);

    let bills = vec![bill("b", "Vendor", 60_000, 10)];
    let in_window = projection::bills_due_in_window(&bills, today, date(2026, 6, 19));
    let projection = projection::project(&ProjectionInputs {
        current_balance: Money::from_cents(10_000),
        bills_in_window: in_window,
        resolutions: &[],
        commission: Some(next),
        today,
    });
    assert_eq!(projection.liquidity_balance, Money::from_cents(110_000));
    assert_eq!(projection.safe_to_spend, Money::from_cents(50_000));
    assert_eq!(projection.projected_balance, Money::from_cents(50_000));
}

#[test]
fn export_round_trips_through_the_flat_table() {
    let processor = TransactionProcessor::new();
    let (txs, _) = ingest(MERGED_EXPORT, &processor, &options(date(2026, 6, 10)));
    let table = write_table(&txs).unwrap();
    let mut lines = table.lines();
    assert!(lines.next().unwrap().starts_with("date,description,amount"));
    assert_eq!(lines.count(), txs.len());
    assert!(table.contains("-1250.00"));
}

#[test]
fn garbage_and_exports_can_interleave() {
    let text = format!("random pasted note\n\n{MERGED_EXPORT}\nanother stray line\n");
    let outcome = parse_statements(&text);
    assert_eq!(outcome.records.len(), 5);
}
