use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// A dollar amount, exact to the cent. Negative = expense, positive = income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).round().to_i64().unwrap_or(0)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Convenience for tests and the CLI config layer.
    pub fn from_dollars(dollars: f64) -> Self {
        Decimal::from_f64_retain(dollars)
            .map(Money::from_decimal)
            .unwrap_or_else(Money::zero)
    }

    /// Parse an amount as statements actually print them: optional leading
    /// `$`, comma thousands separators, and accounting-style parentheses for
    /// negatives (`(1,234.56)`).
    pub fn parse_statement_amount(raw: &str) -> Option<Self> {
        let s = raw.trim().trim_matches('"').trim();
        if s.is_empty() {
            return None;
        }
        let (negative, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
            Some(inner) => (true, inner),
            None => (false, s),
        };
        let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '$' | ' ')).collect();
        let mut dec = Decimal::from_str(&cleaned).ok()?;
        if negative {
            dec = -dec;
        }
        Some(Money::from_decimal(dec))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }

    /// `self` as a whole percentage of `whole`, clamped to [0, 100].
    /// A zero or negative `whole` reads as fully covered.
    pub fn percent_of(self, whole: Self) -> i64 {
        if whole.0 <= Decimal::ZERO {
            return 100;
        }
        let pct = (self.0 / whole.0 * Decimal::from(100)).round();
        pct.to_i64().unwrap_or(0).clamp(0, 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_sign_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}
