use serde::{Deserialize, Serialize};
use std::fmt;

/// A named route such as "Delhi → Agra".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank names never match a catalog entry.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Destination {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Pricing channel a fare is quoted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MakeMyTrip,
    RedBus,
    Ixigo,
    Own,
}

impl Platform {
    /// Display order used by the price comparison.
    pub const ALL: [Platform; 4] = [
        Platform::MakeMyTrip,
        Platform::RedBus,
        Platform::Ixigo,
        Platform::Own,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Platform::MakeMyTrip => "makemytrip",
            Platform::RedBus => "redbus",
            Platform::Ixigo => "ixigo",
            Platform::Own => "own",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::MakeMyTrip => "MakeMyTrip",
            Platform::RedBus => "RedBus",
            Platform::Ixigo => "Ixigo",
            Platform::Own => "Our Website",
        }
    }

    pub fn is_popular(self) -> bool {
        self == Platform::RedBus
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_keys_round_trip() {
        for platform in Platform::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform.key()));
            assert_eq!(serde_json::from_str::<Platform>(&json).unwrap(), platform);
        }
    }

    #[test]
    fn test_unknown_platform_rejected() {
        assert!(serde_json::from_str::<Platform>("\"goibibo\"").is_err());
    }

    #[test]
    fn test_blank_destination() {
        assert!(Destination::new("   ").is_blank());
        assert!(!Destination::from("Delhi → Agra").is_blank());
    }
}
