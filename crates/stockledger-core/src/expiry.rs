//! Expiry date keys.
//!
//! An [`Expiry`] is the best-before date of a batch and also the cutoff passed
//! to [`Ledger::remove_expired`](crate::Ledger::remove_expired). At the
//! boundary it is written as an 8-digit `YYYYMMDD` key, so ordering keys
//! lexicographically and ordering dates agree.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::LedgerError;

const KEY_FORMAT: &str = "%Y%m%d";

/// Years that fit the four-digit year of a key.
const KEY_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// A batch expiry date.
///
/// # Examples
///
/// ```
/// use stockledger_core::Expiry;
///
/// let early: Expiry = "20211111".parse().unwrap();
/// let late: Expiry = "20771023".parse().unwrap();
///
/// assert!(early < late);
/// assert_eq!(late.to_string(), "20771023");
/// assert!("2021-11-11".parse::<Expiry>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiry(NaiveDate);

impl Expiry {
    /// Wrap a calendar date whose year is in `0..=9999`.
    pub fn new(date: NaiveDate) -> Result<Self, LedgerError> {
        if KEY_YEARS.contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(LedgerError::invalid(
                "expiry",
                format!("year {} does not fit a YYYYMMDD key", date.year()),
            ))
        }
    }

    /// Build an expiry from year, month and day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, LedgerError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            LedgerError::invalid("expiry", format!("{year:04}-{month:02}-{day:02} is not a date"))
        })?;
        Self::new(date)
    }

    /// The underlying calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<NaiveDate> for Expiry {
    type Error = LedgerError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date)
    }
}

impl FromStr for Expiry {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::invalid(
                "expiry",
                format!("expected an 8-digit YYYYMMDD key, got {s:?}"),
            ));
        }
        NaiveDate::parse_from_str(s, KEY_FORMAT)
            .map(Self)
            .map_err(|e| LedgerError::invalid("expiry", format!("{s:?}: {e}")))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let expiry: Expiry = "20220202".parse().unwrap();
        assert_eq!(expiry.date(), NaiveDate::from_ymd_opt(2022, 2, 2).unwrap());
        assert_eq!(expiry, Expiry::from_ymd(2022, 2, 2).unwrap());
    }

    #[test]
    fn test_reject_malformed_keys() {
        for bad in ["", "2022022", "202202021", "2022-02-02", "20221302", "20220230", "abcdefgh"] {
            let err = bad.parse::<Expiry>().unwrap_err();
            assert_eq!(err.argument(), "expiry", "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_from_ymd_rejects_invalid_date() {
        assert!(Expiry::from_ymd(2021, 2, 29).is_err());
    }

    #[test]
    fn test_years_outside_key_range_rejected() {
        for year in [-1, 10_000, 262_000] {
            let err = Expiry::from_ymd(year, 1, 1).unwrap_err();
            assert_eq!(err.argument(), "expiry", "year {year}");
        }

        let edge = Expiry::from_ymd(9999, 12, 31).unwrap();
        assert_eq!(edge.to_string(), "99991231");
        assert_eq!(edge.to_string().parse::<Expiry>(), Ok(edge));
        assert_eq!(Expiry::from_ymd(0, 1, 1).unwrap().to_string(), "00000101");

        let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(Expiry::try_from(far).is_err());
    }

    #[test]
    fn test_ordering_matches_key_ordering() {
        let keys = ["20211101", "20211111", "20220202", "20220315", "20771023"];
        let parsed: Vec<Expiry> = keys.iter().map(|k| k.parse().unwrap()).collect();
        let mut sorted = parsed.clone();
        sorted.sort();
        assert_eq!(parsed, sorted);
    }

    #[test]
    fn test_serde_as_key() {
        let expiry: Expiry = "20211111".parse().unwrap();
        let json = serde_json::to_string(&expiry).unwrap();
        assert_eq!(json, "\"20211111\"");
        let back: Expiry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expiry);
        assert!(serde_json::from_str::<Expiry>("\"2021-11-11\"").is_err());
    }
}
