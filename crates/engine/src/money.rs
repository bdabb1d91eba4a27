use std::{
    fmt,
    iter::Sum,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::EngineError;

const CENTS_PER_UNIT: i64 = 100;

/// Largest magnitude a single amount may have, `9_999_999_999_999.99`.
///
/// Below this bound the JSON number written for an amount always reads back
/// to the same cent, and sums of a month's records stay far from `i64::MAX`.
pub const MAX_ABS_CENTS: i64 = 999_999_999_999_999;

/// Signed currency amount held as **integer cents**.
///
/// Every amount stored in a [`TransactionRecord`] goes through this type so
/// that monthly totals are summed exactly and only rounded when printed.
///
/// The sign carries the direction:
/// - zero or positive = income
/// - negative = expense
///
/// On the wire the amount is a plain JSON number (`12.34`), the same shape the
/// stored documents have always used.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(-12_34);
/// assert_eq!(amount.abs().cents(), 1234);
/// assert_eq!(amount.to_string(), "-12.34");
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
///
/// [`TransactionRecord`]: crate::TransactionRecord
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Income side of the ledger. Zero counts as income.
    #[must_use]
    pub const fn is_income(self) -> bool {
        self.0 >= 0
    }

    #[must_use]
    pub const fn is_expense(self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude is within [`MAX_ABS_CENTS`].
    #[must_use]
    pub const fn is_storable(self) -> bool {
        -MAX_ABS_CENTS <= self.0 && self.0 <= MAX_ABS_CENTS
    }

    /// Adds, clamping at the bounds of `i64` instead of wrapping.
    #[must_use]
    pub const fn saturating_add(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_add(rhs.0))
    }

    /// Magnitude of the amount.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Value in major units, for ratios and charts only.
    #[must_use]
    pub fn as_major_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * CENTS_PER_UNIT as f64).round();
        if cents.abs() > MAX_ABS_CENTS as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / CENTS_PER_UNIT as u64;
        let cents = abs % CENTS_PER_UNIT as u64;
        f.pad(&format!("{sign}{units}.{cents:02}"))
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, MoneyCents::saturating_add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most two fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(reason.to_string());

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped.trim_start()),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
        };
        if rest.is_empty() {
            return Err(invalid("empty amount"));
        }

        let normalized = rest.replace(',', ".");
        let (units_str, fraction_str) = match normalized.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (normalized.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units_str.is_empty() || !all_digits(units_str) || !all_digits(fraction_str) {
            return Err(invalid("invalid amount"));
        }

        let units: i64 = units_str
            .parse()
            .map_err(|_| invalid("amount too large"))?;
        let fraction = match fraction_str.len() {
            0 => 0,
            1 => fraction_str.parse::<i64>().map_err(|_| invalid("invalid amount"))? * 10,
            2 => fraction_str.parse::<i64>().map_err(|_| invalid("invalid amount"))?,
            _ => return Err(invalid("too many decimals")),
        };

        let total = units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|v| v.checked_add(fraction))
            .filter(|v| *v <= MAX_ABS_CENTS)
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}

impl Serialize for MoneyCents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % CENTS_PER_UNIT == 0 {
            serializer.serialize_i64(self.0 / CENTS_PER_UNIT)
        } else {
            serializer.serialize_f64(self.as_major_f64())
        }
    }
}

impl<'de> Deserialize<'de> for MoneyCents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl de::Visitor<'_> for MoneyVisitor {
    type Value = MoneyCents;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a currency amount as a number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        v.checked_mul(CENTS_PER_UNIT)
            .map(MoneyCents)
            .filter(|m| m.is_storable())
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("amount too large"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        MoneyCents::from_major_f64(v).ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
        assert_eq!(format!("{:>8}", MoneyCents::new(1050)), "   10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
        assert_eq!("7.".parse::<MoneyCents>().unwrap().cents(), 700);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
        assert!(".50".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn zero_is_income() {
        assert!(MoneyCents::ZERO.is_income());
        assert!(!MoneyCents::ZERO.is_expense());
        assert!(MoneyCents::new(-1).is_expense());
    }

    #[test]
    fn serializes_as_json_number() {
        assert_eq!(serde_json::to_string(&MoneyCents::new(1234)).unwrap(), "12.34");
        assert_eq!(serde_json::to_string(&MoneyCents::new(-4000)).unwrap(), "-40");
        assert_eq!(serde_json::to_string(&MoneyCents::new(-5)).unwrap(), "-0.05");
    }

    #[test]
    fn deserializes_floats_without_drift() {
        let parsed: Vec<MoneyCents> = serde_json::from_str("[0.1, 0.2, 19.99, -40, 100]").unwrap();
        let cents: Vec<i64> = parsed.iter().map(|m| m.cents()).collect();
        assert_eq!(cents, vec![10, 20, 1999, -4000, 10000]);
        assert_eq!(parsed[0] + parsed[1], MoneyCents::new(30));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let max = MoneyCents::new(MAX_ABS_CENTS);
        assert_eq!("9999999999999.99".parse::<MoneyCents>().unwrap(), max);
        assert_eq!("-9999999999999.99".parse::<MoneyCents>().unwrap(), -max);
        assert!(matches!(
            "10000000000000".parse::<MoneyCents>(),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!("90071992547409.93".parse::<MoneyCents>().is_err());
        assert!("90000000000000000".parse::<MoneyCents>().is_err());

        assert!(serde_json::from_str::<MoneyCents>("90000000000000000").is_err());
        assert!(serde_json::from_str::<MoneyCents>("-10000000000000").is_err());
        assert!(serde_json::from_str::<MoneyCents>("90071992547409.93").is_err());
        assert!(serde_json::from_str::<MoneyCents>("1e300").is_err());
        assert!(!MoneyCents::new(MAX_ABS_CENTS + 1).is_storable());
        assert!(max.is_storable() && (-max).is_storable());
    }

    #[test]
    fn large_amounts_keep_every_cent_through_json() {
        let max = MoneyCents::new(MAX_ABS_CENTS);
        assert_eq!(serde_json::to_string(&max).unwrap(), "9999999999999.99");

        for cents in [
            MAX_ABS_CENTS,
            MAX_ABS_CENTS - 1,
            -MAX_ABS_CENTS,
            123_456_789_012_345,
            900_719_925_474_099,
            -1,
        ] {
            let amount = MoneyCents::new(cents);
            let encoded = serde_json::to_string(&amount).unwrap();
            assert_eq!(
                serde_json::from_str::<MoneyCents>(&encoded).unwrap(),
                amount,
                "{encoded}"
            );
        }
    }

    #[test]
    fn saturating_add_clamps() {
        let big = MoneyCents::new(i64::MAX - 1);
        assert_eq!(big.saturating_add(MoneyCents::new(5)), MoneyCents::new(i64::MAX));
        assert_eq!(
            MoneyCents::new(2).saturating_add(MoneyCents::new(3)),
            MoneyCents::new(5)
        );
    }

    #[test]
    fn sums_exactly() {
        let total: MoneyCents = std::iter::repeat_n(MoneyCents::new(10), 10).sum();
        assert_eq!(total, MoneyCents::new(100));
    }
}
