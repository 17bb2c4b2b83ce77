//! Fixed-point money amounts.
//!
//! Prices arrive as decimal strings from configuration and from the invoicing
//! service (`"5.00"`, `"5"`, `"0.00001000"`). They are parsed once into `i128`
//! base units at 11 decimal places, enough for millisatoshi precision on BTC
//! quotes, so that equality never depends on how many trailing zeros either
//! side happened to print.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fractional digits kept by [`Amount`]. 1 msat = 0.00000000001 BTC.
pub const AMOUNT_SCALE: usize = 11;

/// Base units per whole currency unit (`10^AMOUNT_SCALE`).
pub const UNITS_PER_WHOLE: i128 = 100_000_000_000;

/// Errors returned by [`Amount::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    Negative,
    InvalidFormat(String),
    /// More than 11 fractional digits; rejected to avoid rounding ambiguity.
    TooManyDecimals,
    OutOfRange,
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "amount: empty string"),
            AmountError::Negative => write!(f, "amount: negative values are not allowed"),
            AmountError::InvalidFormat(s) => write!(f, "amount: invalid decimal '{s}'"),
            AmountError::TooManyDecimals => {
                write!(f, "amount: more than {AMOUNT_SCALE} decimal places")
            }
            AmountError::OutOfRange => write!(f, "amount: value out of range"),
        }
    }
}

impl std::error::Error for AmountError {}

/// A non-negative decimal money amount held as integer base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_units(units: i128) -> Result<Self, AmountError> {
        if units < 0 {
            return Err(AmountError::Negative);
        }
        Ok(Amount(units))
    }

    /// Value in base units (`10^-11` of a whole unit).
    pub fn units(&self) -> i128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal string deterministically.
    ///
    /// Accepts an optional leading `+`. Rejects negatives, exponent notation,
    /// and anything beyond 11 fractional digits.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let s = s.strip_prefix('+').unwrap_or(s);
        if s.starts_with('-') {
            return Err(AmountError::Negative);
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::InvalidFormat(s.to_string()));
        }
        let digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !digits(int_part) || !digits(frac_part) {
            return Err(AmountError::InvalidFormat(s.to_string()));
        }
        if frac_part.len() > AMOUNT_SCALE {
            return Err(AmountError::TooManyDecimals);
        }

        let int_val: i128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse::<i128>()
                .map_err(|_| AmountError::OutOfRange)?
        };

        let mut frac = frac_part.to_string();
        while frac.len() < AMOUNT_SCALE {
            frac.push('0');
        }
        let frac_val: i128 = frac
            .parse::<i128>()
            .map_err(|_| AmountError::InvalidFormat(s.to_string()))?;

        int_val
            .checked_mul(UNITS_PER_WHOLE)
            .and_then(|v| v.checked_add(frac_val))
            .map(Amount)
            .ok_or(AmountError::OutOfRange)
    }
}

/// Renders with at least two fractional digits and no trailing zeros beyond
/// them: `5` → `"5.00"`, `0.00001000` → `"0.00001"`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / UNITS_PER_WHOLE;
        let mut frac = format!("{:0width$}", self.0 % UNITS_PER_WHOLE, width = AMOUNT_SCALE);
        while frac.len() > 2 && frac.ends_with('0') {
            frac.pop();
        }
        write!(f, "{int}.{frac}")
    }
}

impl std::str::FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: i128 = UNITS_PER_WHOLE;

    #[test]
    fn parse_basic() {
        assert_eq!(Amount::parse("0").unwrap().units(), 0);
        assert_eq!(Amount::parse("5").unwrap().units(), 5 * ONE);
        assert_eq!(Amount::parse("5.00").unwrap().units(), 5 * ONE);
        assert_eq!(Amount::parse(" +1.23 ").unwrap().units(), 123 * ONE / 100);
        assert_eq!(Amount::parse(".5").unwrap().units(), ONE / 2);
        assert_eq!(Amount::parse("7.").unwrap().units(), 7 * ONE);
    }

    #[test]
    fn satoshi_and_msat_precision() {
        let sat = Amount::parse("0.00000001").unwrap();
        assert_eq!(sat.units(), 1_000);
        let msat = Amount::parse("0.00000000001").unwrap();
        assert_eq!(msat.units(), 1);
        assert_eq!(
            Amount::parse("0.00001000").unwrap(),
            Amount::parse("0.00001").unwrap()
        );
    }

    #[test]
    fn trailing_zeros_do_not_change_value() {
        assert_eq!(Amount::parse("5").unwrap(), Amount::parse("5.00000000000").unwrap());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
        assert_eq!(Amount::parse("-1.00"), Err(AmountError::Negative));
        assert_eq!(Amount::parse("1.000000000001"), Err(AmountError::TooManyDecimals));
        assert!(matches!(Amount::parse("1e3"), Err(AmountError::InvalidFormat(_))));
        assert!(matches!(Amount::parse("1.2.3"), Err(AmountError::InvalidFormat(_))));
        assert!(matches!(Amount::parse("."), Err(AmountError::InvalidFormat(_))));
        assert_eq!(
            Amount::parse("99999999999999999999999999999999999999999"),
            Err(AmountError::OutOfRange)
        );
    }

    #[test]
    fn display_keeps_two_decimals_minimum() {
        assert_eq!(Amount::parse("5").unwrap().to_string(), "5.00");
        assert_eq!(Amount::parse("0.1").unwrap().to_string(), "0.10");
        assert_eq!(Amount::parse("1.2345").unwrap().to_string(), "1.2345");
        assert_eq!(Amount::parse("0.00001000").unwrap().to_string(), "0.00001");
        assert_eq!(Amount::parse("0.00000000001").unwrap().to_string(), "0.00000000001");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let a = Amount::parse("12.50").unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Amount = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<Amount>("\"-3\"").is_err());
    }
}
