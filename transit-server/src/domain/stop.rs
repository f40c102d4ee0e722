//! Stop name type.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid stop name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop name: {reason}")]
pub struct InvalidStopName {
    reason: &'static str,
}

/// The name of a stop, which doubles as its identity in the network.
///
/// Names are trimmed of surrounding whitespace and must not be empty.
/// Comparison is exact (case-sensitive), matching how stops are keyed in
/// the graph.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StopName;
///
/// let stop = StopName::parse("  Central Station ").unwrap();
/// assert_eq!(stop.as_str(), "Central Station");
///
/// assert!(StopName::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopName(String);

impl StopName {
    /// Parse a stop name, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopName> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStopName {
                reason: "stop name cannot be empty",
            });
        }
        Ok(StopName(trimmed.to_string()))
    }

    /// Returns the stop name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopName {
    type Error = InvalidStopName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StopName::parse(&value)
    }
}

impl From<StopName> for String {
    fn from(value: StopName) -> Self {
        value.0
    }
}

impl Borrow<str> for StopName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopName({})", self.0)
    }
}

impl fmt::Display for StopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
