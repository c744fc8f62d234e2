use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{self, HolidayTable};

/// Payment is issued this many business days after a cutoff.
const PAYMENT_LAG_BUSINESS_DAYS: u32 = 4;

/// Commission cutoff day mid-month; the second cutoff is the last calendar day.
const MID_MONTH_CUTOFF_DAY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Inclusive on both ends — bill due-date windows.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Inclusive start, exclusive end — the pay window runs from a payment's
    /// arrival up to (not including) the following cutoff.
    pub fn contains_half_open(self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// One commission period: the cutoff that closes it and the business-day
/// payment date that settles it. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    pub cutoff: NaiveDate,
    pub payment_date: NaiveDate,
    pub label: String,
}

impl PayPeriod {
    fn for_cutoff(cutoff: NaiveDate, earned_from: NaiveDate, holidays: &HolidayTable) -> Self {
        let payment_date =
            calendar::nth_business_day_after(cutoff, PAYMENT_LAG_BUSINESS_DAYS, holidays);
        let label = format!(
            "{} {}-{} {} commissions",
            cutoff.format("%b"),
            earned_from.day(),
            cutoff.day(),
            cutoff.year()
        );
        PayPeriod { cutoff, payment_date, label }
    }
}

/// The month's two periods: 1st–15th and 16th–EOM, in chronological order.
pub fn periods_for_month(year: i32, month: u32, holidays: &HolidayTable) -> [PayPeriod; 2] {
    let mid_cutoff = NaiveDate::from_ymd_opt(year, month, MID_MONTH_CUTOFF_DAY).unwrap();
    let eom_cutoff = calendar::last_day_of_month(year, month);
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let sixteenth = NaiveDate::from_ymd_opt(year, month, MID_MONTH_CUTOFF_DAY + 1).unwrap();
    [
        PayPeriod::for_cutoff(mid_cutoff, first, holidays),
        PayPeriod::for_cutoff(eom_cutoff, sixteenth, holidays),
    ]
}

fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}

/// The next period whose payment date is strictly after `today`.
///
/// If today is itself a payment date this bridges forward to the following
/// one — downstream window logic assumes "next payday" never equals today.
pub fn next_payment(today: NaiveDate, holidays: &HolidayTable) -> PayPeriod {
    upcoming_periods(today, 3, holidays)
        .into_iter()
        .find(|p| p.payment_date > today)
        // Three months of cutoffs always contain a payment date past today;
        // the earliest candidate is this month's mid-month payment.
        .expect("a payment date exists within three months")
}

/// All periods for `months` months starting with today's month, in
/// chronological order.
pub fn upcoming_periods(today: NaiveDate, months: u32, holidays: &HolidayTable) -> Vec<PayPeriod> {
    let mut periods = Vec::with_capacity(months as usize * 2);
    for offset in 0..months as i32 {
        let (y, m) = add_months(today.year(), today.month(), offset);
        periods.extend(periods_for_month(y, m, holidays));
    }
    periods
}

/// The window a transaction must fall in to impact the current pay period:
/// from the most recent payment date on or before `today` (inclusive) to the
/// cutoff that follows it (exclusive).
pub fn current_pay_window(today: NaiveDate, holidays: &HolidayTable) -> DateRange {
    // Payments lag cutoffs by under two weeks, so three months of lookback
    // always covers the most recent settled payment.
    let mut periods = Vec::new();
    for offset in -3..=0 {
        let (y, m) = add_months(today.year(), today.month(), offset);
        periods.extend(periods_for_month(y, m, holidays));
    }
    let latest_paid = periods
        .iter()
        .rev()
        .find(|p| p.payment_date <= today)
        .expect("a settled payment exists within three months");
    let following_cutoff = periods
        .iter()
        .map(|p| p.cutoff)
        .find(|&c| c > latest_paid.cutoff)
        .unwrap_or_else(|| calendar::last_day_of_month(today.year(), today.month()));
    DateRange::new(latest_paid.payment_date, following_cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> HolidayTable {
        HolidayTable::default()
    }

    #[test]
    fn month_has_two_cutoffs() {
        let [mid, eom] = periods_for_month(2026, 6, &table());
        assert_eq!(mid.cutoff, date(2026, 6, 15));
        assert_eq!(eom.cutoff, date(2026, 6, 30));
        assert!(mid.payment_date < eom.payment_date);
    }

    #[test]
    fn payment_is_fourth_business_day_after_cutoff() {
        // June 15 2026 is a Monday: Tue 16, Wed 17, Thu 18, Fri 19.
        let [mid, _] = periods_for_month(2026, 6, &table());
        assert_eq!(mid.payment_date, date(2026, 6, 19));
    }

    #[test]
    fn payment_skips_weekend_and_holiday() {
        // Dec 31 2025 cutoff: Jan 1 holiday + weekend push payment to Jan 7.
        let [_, eom] = periods_for_month(2025, 12, &table());
        assert_eq!(eom.payment_date, date(2026, 1, 7));
    }

    #[test]
    fn next_payment_returns_first_future_payday() {
        let next = next_payment(date(2026, 6, 1), &table());
        assert_eq!(next.cutoff, date(2026, 6, 15));
        assert_eq!(next.payment_date, date(2026, 6, 19));
    }

    #[test]
    fn next_payment_bridges_past_today() {
        // June 19 2026 is itself a payment date — must bridge to the next one.
        let today = date(2026, 6, 19);
        let next = next_payment(today, &table());
        assert!(next.payment_date > today);
        assert_eq!(next.cutoff, date(2026, 6, 30));
    }

    #[test]
    fn next_payment_crosses_year_boundary() {
        let next = next_payment(date(2026, 12, 28), &table());
        assert_eq!(next.cutoff, date(2026, 12, 31));
        assert!(next.payment_date > date(2026, 12, 31));
        assert_eq!(next.payment_date.year(), 2027);
    }

    #[test]
    fn period_labels_are_human_readable() {
        let [mid, eom] = periods_for_month(2026, 1, &table());
        assert_eq!(mid.label, "Jan 1-15 2026 commissions");
        assert_eq!(eom.label, "Jan 16-31 2026 commissions");
    }

    #[test]
    fn pay_window_starts_at_latest_settled_payment() {
        // June 19 2026 payment settled; window runs to the June 30 cutoff.
        let window = current_pay_window(date(2026, 6, 22), &table());
        assert_eq!(window.start, date(2026, 6, 19));
        assert_eq!(window.end, date(2026, 6, 30));
        assert!(window.contains_half_open(date(2026, 6, 19)));
        assert!(window.contains_half_open(date(2026, 6, 29)));
        assert!(!window.contains_half_open(date(2026, 6, 30)));
    }

    #[test]
    fn pay_window_crosses_month_boundary() {
        // On July 2 the June 30 cutoff has passed but its payment has not
        // settled, so the active window is still the one the June 19
        // payment opened.
        let window = current_pay_window(date(2026, 7, 2), &table());
        assert_eq!(window.start, date(2026, 6, 19));
        assert_eq!(window.end, date(2026, 6, 30));
    }

    #[test]
    fn date_range_contains_variants() {
        let range = DateRange::new(date(2026, 1, 10), date(2026, 1, 20));
        assert!(range.contains(date(2026, 1, 20)));
        assert!(!range.contains_half_open(date(2026, 1, 20)));
        assert!(range.contains_half_open(date(2026, 1, 10)));
        assert!(!range.contains(date(2026, 1, 9)));
    }
}
