use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How the remote engine may cache the result of a function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Let the engine decide.
    #[default]
    Default,
    Never,
    /// Cached for the duration of the client session.
    Session,
    /// Cached for the given time to live.
    Ttl(Duration),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid cache policy '{value}': expected 'never', 'session' or a duration such as '30s', '10m' or '1h30m'")]
pub struct CachePolicyParseError {
    pub value: String,
}

impl CachePolicy {
    /// The time to live in the engine notation (`90s`), if any.
    pub fn time_to_live(&self) -> Option<String> {
        match self {
            CachePolicy::Ttl(duration) => Some(format!("{}s", duration.as_secs())),
            _ => None,
        }
    }
}

impl FromStr for CachePolicy {
    type Err = CachePolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        match trimmed {
            "" => return Ok(CachePolicy::Default),
            "never" => return Ok(CachePolicy::Never),
            "session" => return Ok(CachePolicy::Session),
            _ => {}
        }

        parse_duration(trimmed)
            .map(CachePolicy::Ttl)
            .ok_or_else(|| CachePolicyParseError {
                value: value.to_string(),
            })
    }
}

fn parse_duration(value: &str) -> Option<Duration> {
    let mut total = 0u64;
    let mut digits = String::new();
    let mut saw_unit = false;

    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let amount: u64 = digits.parse().ok()?;
        digits.clear();

        let multiplier = match ch {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(amount.checked_mul(multiplier)?)?;
        saw_unit = true;
    }

    if !digits.is_empty() || !saw_unit || total == 0 {
        return None;
    }

    Some(Duration::from_secs(total))
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachePolicy::Default => Ok(()),
            CachePolicy::Never => f.write_str("never"),
            CachePolicy::Session => f.write_str("session"),
            CachePolicy::Ttl(duration) => write!(f, "{}s", duration.as_secs()),
        }
    }
}

impl Serialize for CachePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CachePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", CachePolicy::Default)]
    #[case("never", CachePolicy::Never)]
    #[case("session", CachePolicy::Session)]
    #[case("30s", CachePolicy::Ttl(Duration::from_secs(30)))]
    #[case("10m", CachePolicy::Ttl(Duration::from_secs(600)))]
    #[case("1h30m", CachePolicy::Ttl(Duration::from_secs(5400)))]
    #[case("2d", CachePolicy::Ttl(Duration::from_secs(172_800)))]
    fn parses(#[case] input: &str, #[case] expected: CachePolicy) {
        assert_eq!(input.parse::<CachePolicy>().unwrap(), expected);
    }

    #[rstest]
    #[case("forever")]
    #[case("10")]
    #[case("0s")]
    #[case("5x")]
    fn rejects(#[case] input: &str) {
        assert!(input.parse::<CachePolicy>().is_err());
    }

    #[test]
    fn time_to_live_is_rendered_in_seconds() {
        let policy: CachePolicy = "1h".parse().unwrap();
        assert_eq!(policy.time_to_live().as_deref(), Some("3600s"));
        assert_eq!(CachePolicy::Never.time_to_live(), None);
    }
}
