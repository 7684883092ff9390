use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Subscription price with a fixed precision of two decimal places
///
/// Stored as a whole number of cents, so it can never be negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

impl Price {
    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must not be negative")]
    Negative,
    #[error("price must have at most two decimal places")]
    TooPrecise,
    #[error("price is too large")]
    Overflow,
    #[error("price must be a decimal number, got {0:?}")]
    Malformed(String),
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(PriceError::Negative);
        }
        let malformed = || PriceError::Malformed(s.to_string());

        let (units, fraction) = match s.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (s, ""),
        };
        if units.is_empty() || !units.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        // Trailing zeros carry no precision ("50.000" is still 50.00)
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(PriceError::TooPrecise);
        }

        let units: u64 = units.parse().map_err(|_| PriceError::Overflow)?;
        let fraction: u64 = format!("{fraction:0<2}").parse().map_err(|_| malformed())?;

        units
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Price::from_cents)
            .ok_or(PriceError::Overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Prices are accepted both as JSON numbers and as decimal strings
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Number(serde_json::Number),
            Text(String),
        }

        let raw = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(number) => number.to_string(),
            RawPrice::Text(text) => text,
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use speculoos::prelude::*;

    #[rstest]
    #[case("50", 5000)]
    #[case("50.0", 5000)]
    #[case("49.99", 4999)]
    #[case("0.5", 50)]
    #[case("0", 0)]
    #[case("12.300", 1230)]
    #[case(" 7.05 ", 705)]
    fn test_parse_valid(#[case] input: &str, #[case] cents: u64) {
        assert_that!(input.parse::<Price>())
            .is_ok()
            .is_equal_to(Price::from_cents(cents));
    }

    #[rstest]
    #[case("-1", PriceError::Negative)]
    #[case("1.234", PriceError::TooPrecise)]
    #[case("abc", PriceError::Malformed("abc".to_string()))]
    #[case(".5", PriceError::Malformed(".5".to_string()))]
    #[case("1.2.3", PriceError::Malformed("1.2.3".to_string()))]
    #[case("99999999999999999999", PriceError::Overflow)]
    fn test_parse_invalid(#[case] input: &str, #[case] expected: PriceError) {
        assert_that!(input.parse::<Price>())
            .is_err()
            .is_equal_to(expected);
    }

    #[test]
    fn test_json_number_and_string() {
        let from_number: Price = serde_json::from_str("50.5").unwrap();
        let from_string: Price = serde_json::from_str("\"50.50\"").unwrap();
        assert_that!(from_number).is_equal_to(from_string);
        assert_that!(serde_json::to_string(&from_number).unwrap())
            .is_equal_to("\"50.50\"".to_string());
    }

    #[test]
    fn test_json_negative_number() {
        let res = serde_json::from_str::<Price>("-3");
        assert_that!(res).is_err();
    }
}
