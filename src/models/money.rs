//! Money type for ledger amounts
//!
//! Amounts are integer cents (i64) end to end; nothing in the ledger touches
//! floating point. Ratios derived from money come back as integer basis
//! points for the same reason.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A monetary amount in cents, single currency per data set
///
/// Every ledger field (estimates, actuals, invoiced, paid, billed, payments)
/// is one of these. Serializes as the bare cent count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn zero() -> Self {
        Money(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Ratio of `self` to `denominator` in basis points (1/100 of a percent)
    ///
    /// Returns `None` when the denominator is zero so callers decide what an
    /// undefined ratio means (threshold evaluation treats it as not reached).
    ///
    /// # Examples
    /// ```
    /// use costbook::models::Money;
    /// let actual = Money::from_cents(650_000);
    /// let estimate = Money::from_cents(600_000);
    /// assert_eq!(actual.ratio_bps(estimate), Some(10_833)); // 108.33%
    /// ```
    pub fn ratio_bps(&self, denominator: Money) -> Option<i64> {
        if denominator.0 == 0 {
            None
        } else {
            Some(self.0.saturating_mul(10_000) / denominator.0)
        }
    }

    /// Parse an amount like "6200.00", "$6200.00", "-40.50", or "6200"
    ///
    /// A bare integer is whole currency units. Fractions are cut to two
    /// digits; a one-digit fraction means tenths.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let bad = || MoneyParseError(s.to_string());
        let trimmed = s.trim();

        let (sign, rest) = match trimmed.strip_prefix('-') {
            Some(r) => (-1, r),
            None => (1, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        // The sign was already taken; a second one would make the
        // units-times-100 arithmetic silently wrong
        if rest.starts_with('-') {
            return Err(bad());
        }

        let cents = match rest.split_once('.') {
            Some((whole, frac)) => {
                let units: i64 = whole.parse().map_err(|_| bad())?;
                let frac_cents = match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().map_err(|_| bad())? * 10,
                    // get() rather than slicing keeps odd multibyte input
                    // on the error path instead of panicking
                    _ => frac.get(..2).ok_or_else(bad)?.parse().map_err(|_| bad())?,
                };
                units * 100 + frac_cents
            }
            None => rest.parse::<i64>().map_err(|_| bad())? * 100,
        };

        Ok(Money(sign * cents))
    }
}

/// Format basis points as a percentage: 10833 -> "108.33%"
pub fn format_bps(bps: i64) -> String {
    let sign = if bps < 0 { "-" } else { "" };
    let abs = bps.abs();
    format!("{}{}.{:02}%", sign, abs / 100, abs % 100)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

/// Input that could not be read as a money amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyParseError(String);

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a money amount: '{}'", self.0)
    }
}

impl std::error::Error for MoneyParseError {}
