use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Date-keyed set of bank holidays.
///
/// Generated from observed US federal rules rather than a hand-curated list,
/// so the business-day calculator stays correct for any year the caller asks
/// about. Extra dates (credit-union closures, state holidays) can still be
/// inserted literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTable {
    dates: BTreeSet<NaiveDate>,
}

impl Default for HolidayTable {
    fn default() -> Self {
        HolidayTable::us_federal(2025..=2027)
    }
}

impl HolidayTable {
    pub fn empty() -> Self {
        HolidayTable { dates: BTreeSet::new() }
    }

    pub fn with_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        HolidayTable { dates: dates.into_iter().collect() }
    }

    /// Observed US federal bank holidays for every year in `years`.
    ///
    /// Fixed-date holidays falling on a weekend shift to the nearest weekday
    /// (Saturday observes Friday, Sunday observes Monday), which can land an
    /// observance just outside `years` at the boundaries — those dates are
    /// kept, since the observance is what closes the bank.
    pub fn us_federal(years: RangeInclusive<i32>) -> Self {
        let mut dates = BTreeSet::new();
        for year in years {
            // Fixed dates, weekend-shifted.
            for (month, day) in [(1, 1), (6, 19), (7, 4), (11, 11), (12, 25)] {
                if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
                    dates.insert(observed(d));
                }
            }
            // Floating rules.
            dates.insert(nth_weekday_of_month(year, 1, Weekday::Mon, 3)); // MLK Day
            dates.insert(nth_weekday_of_month(year, 2, Weekday::Mon, 3)); // Washington's Birthday
            dates.insert(last_weekday_of_month(year, 5, Weekday::Mon)); // Memorial Day
            dates.insert(nth_weekday_of_month(year, 9, Weekday::Mon, 1)); // Labor Day
            dates.insert(nth_weekday_of_month(year, 10, Weekday::Mon, 2)); // Columbus Day
            dates.insert(nth_weekday_of_month(year, 11, Weekday::Thu, 4)); // Thanksgiving
        }
        HolidayTable { dates }
    }

    pub fn insert(&mut self, date: NaiveDate) {
        self.dates.insert(date);
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Weekend dates observe the nearest weekday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first + Duration::days(offset as i64 + 7 * (n as i64 - 1))
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap();
    let offset = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last - Duration::days(offset as i64)
}

pub fn is_business_day(date: NaiveDate, holidays: &HolidayTable) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(date)
}

/// The `n`th business day strictly after `date`. Walks one calendar day at a
/// time, counting only weekdays that are not listed holidays. `n = 0` is
/// `date` itself.
pub fn nth_business_day_after(date: NaiveDate, n: u32, holidays: &HolidayTable) -> NaiveDate {
    let mut current = date;
    let mut counted = 0;
    while counted < n {
        current += Duration::days(1);
        if is_business_day(current, holidays) {
            counted += 1;
        }
    }
    current
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_next = NaiveDate::from_ymd_opt(ny, nm, 1).unwrap();
    (first_next - Duration::days(1)).day()
}

/// Clamp a nominal day-of-month (1–31) to a real date: the 31st in February
/// becomes the 28th/29th, never a rollover and never an error.
pub fn clamp_day_to_month(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.max(1).min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap()
}

pub fn first_of_next_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1).unwrap()
}
