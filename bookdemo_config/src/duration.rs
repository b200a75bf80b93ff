use std::{ops::Deref, str::FromStr};

use serde::Deserialize;

/// A duration written as whitespace separated `<number><unit>` terms, e.g.
/// `"1h 30m"`. Supported units are `s`, `m`, `h` and `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Duration(pub std::time::Duration);

impl FromStr for Duration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(0u64, |total, term| total.checked_add(term_seconds(term)?))
            .map(|secs| Self(std::time::Duration::from_secs(secs)))
            .ok_or_else(|| format!("Invalid duration: {s:?}"))
    }
}

/// Seconds of a single `<number><unit>` term
fn term_seconds(term: &str) -> Option<u64> {
    let (number, unit) = term.split_at(term.find(|c: char| !c.is_ascii_digit())?);
    let unit_seconds = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    number.parse::<u64>().ok()?.checked_mul(unit_seconds)
}

impl TryFrom<String> for Duration {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let secs = |s: &str| s.parse::<Duration>().ok().map(|x| x.as_secs());

        assert_eq!(secs("10s"), Some(10));
        assert_eq!(secs("5m"), Some(300));
        assert_eq!(secs("2h"), Some(7200));
        assert_eq!(secs("1d"), Some(86400));
        assert_eq!(secs("1h 5m"), Some(3900));
        assert_eq!(secs("  1m   1s "), Some(61));
        assert_eq!(secs(""), Some(0));
    }

    #[test]
    fn parse_invalid() {
        for input in ["10", "s", "1w", "5mm", "-1s", "1.5h", "99999999999999999999s"] {
            assert!(input.parse::<Duration>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn deserialize() {
        let duration = serde_json::from_str::<Duration>(r#""1h 30m""#).unwrap();
        assert_eq!(*duration, std::time::Duration::from_secs(5400));

        assert!(serde_json::from_str::<Duration>(r#""soon""#).is_err());
    }
}
