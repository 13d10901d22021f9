//! # Money Module
//!
//! Monetary values as integer cents and percentages as basis points.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                     │
//! │                                                                 │
//! │  In floating point:                                             │
//! │    0.1 + 0.2 = 0.30000000000000004   WRONG                      │
//! │                                                                 │
//! │  OUR SOLUTION: Integer Cents                                    │
//! │    Monetary columns are fixed-point with 2 decimal places, so   │
//! │    i64 cents represents them exactly. Percentages are basis     │
//! │    points (1 bps = 0.01%), so 10.00% is the integer 1000.       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! Wherever a rate is applied to an amount, the result is rounded
//! **half-up to the cent**: `(cents * bps + 5000) / 10000`. This is the
//! documented monetary rounding mode for the whole schema (discounted
//! prices, tax amounts, commission math).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Rate (basis points)
// =============================================================================

/// A percentage expressed in basis points.
///
/// 1 basis point = 0.01% = 1/10000. A 10% discount is `Rate::from_bps(1000)`;
/// a 8.25% tax is `Rate::from_bps(825)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (display convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// - **i64 (signed)**: refunds and adjustments may be negative
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - Every monetary field in the schema (`*_cents`) round-trips through
///   this type for arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use webpos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the portion of this amount given by `rate`, rounded
    /// half-up to the cent.
    ///
    /// This is the single place rates meet amounts: tax amounts,
    /// discount amounts and percentage commissions all come from here.
    ///
    /// ```rust
    /// use webpos_core::money::{Money, Rate};
    ///
    /// let amount = Money::from_cents(1000);        // 10.00
    /// let tax = amount.portion(Rate::from_bps(825)); // 8.25%
    /// assert_eq!(tax.cents(), 83);                 // 0.825 rounds up
    /// ```
    pub fn portion(&self, rate: Rate) -> Money {
        // i128 intermediate prevents overflow on large amounts.
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Returns this amount reduced by `rate` percent.
    ///
    /// ```rust
    /// use webpos_core::money::{Money, Rate};
    ///
    /// let price = Money::from_cents(10000);              // 100.00
    /// let sale = price.less_rate(Rate::from_bps(1000));  // 10% off
    /// assert_eq!(sale.cents(), 9000);                    // 90.00
    /// ```
    pub fn less_rate(&self, rate: Rate) -> Money {
        *self - self.portion(rate)
    }

    /// Multiplies by a line-item quantity.
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display; user-facing formatting (currency symbol,
/// localization) belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
