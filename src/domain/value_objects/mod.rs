//! Value Objects for the point of sale

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// Rounds to currency precision (paise).
pub fn round2(value: Decimal) -> Decimal { value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) }

/// Rounds to weight precision (grams, expressed in kilograms).
pub fn round3(value: Decimal) -> Decimal { value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero) }

/// Catalog identifier value object
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(value: impl Into<String>) -> Self { Self(value.into().trim().to_string()) }

    /// Derives an id from a display name: lowercase, every non-alphanumeric character becomes `_`.
    pub fn from_name(name: &str) -> Self {
        Self(name.trim().chars().map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }).collect())
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for CatalogId { fn from(value: &str) -> Self { Self::new(value) } }

/// Money value object, always held at two decimal places.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self { Self(round2(amount)) }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn subtract(&self, other: &Money) -> Money { Money::new(self.0 - other.0) }

    pub fn checked_add(&self, other: &Money) -> Result<Money, ValidationError> {
        self.0.checked_add(other.0).map(Money).ok_or(ValidationError::AmountTooLarge)
    }

    /// Price of `quantity` at this rate per kilogram, rounded to currency precision.
    pub fn per_kg_times(&self, quantity: Kilograms) -> Result<Money, ValidationError> {
        quantity.value().checked_mul(self.0).map(Money::new).ok_or(ValidationError::AmountTooLarge)
    }

    /// Cash handed over at the counter. Fractions of a paisa are dropped, never rounded up,
    /// so a tender only covers a total it really covers.
    pub fn tendered(amount: Decimal) -> Money { Self(amount.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity)) }

    /// Reads a typed cash amount such as `"₹ 45.50"`: everything but digits, `.` and `-`
    /// is dropped first. Input with no usable number is worth zero.
    pub fn parse_tendered(input: &str) -> Money {
        let kept: String = input.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-').collect();
        Money::tendered(leading_decimal(&kept).unwrap_or(Decimal::ZERO))
    }

    /// Reads a price cell. Parsing stops at the first character that cannot continue a
    /// number, so `"40/45"` is 40; a cell that does not start with a number is zero.
    pub fn parse_price(input: &str) -> Money { Money::new(leading_decimal(input.trim()).unwrap_or(Decimal::ZERO)) }
}

impl From<Decimal> for Money { fn from(value: Decimal) -> Self { Self::new(value) } }
impl From<Money> for Decimal { fn from(value: Money) -> Self { value.0 } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

/// Weight in kilograms at gram precision. Always strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Kilograms(Decimal);

impl Kilograms {
    /// Quick-pick gram amounts offered by the quantity picker.
    pub const QUICK_PICKS: [u32; 4] = [100, 250, 500, 1000];

    pub fn from_grams(grams: Decimal) -> Result<Self, ValidationError> {
        if grams <= Decimal::ZERO { return Err(ValidationError::NonPositiveQuantity); }
        Self::new(grams / Decimal::ONE_THOUSAND)
    }

    pub fn new(kg: Decimal) -> Result<Self, ValidationError> {
        let kg = round3(kg);
        if kg <= Decimal::ZERO { return Err(ValidationError::NonPositiveQuantity); }
        Ok(Self(kg))
    }

    pub fn value(&self) -> Decimal { self.0 }
}

impl TryFrom<Decimal> for Kilograms {
    type Error = ValidationError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}
impl From<Kilograms> for Decimal { fn from(value: Kilograms) -> Self { value.0 } }

impl fmt::Display for Kilograms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.3}", self.0) }
}

/// Longest prefix of `input` of the form `[-+]digits[.digits]`.
fn leading_decimal(input: &str) -> Option<Decimal> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in input.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            d if d.is_ascii_digit() => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    let prefix = input[..end].trim_start_matches('+').trim_end_matches('.');
    Decimal::from_str(prefix).ok()
}
