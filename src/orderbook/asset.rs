//! Asset and account identifiers.
//!
//! Every index in the graph is keyed by the canonical string form of an
//! asset: `native` for the ledger's native asset and `CODE:ISSUER` for
//! issued assets. Two assets are equal exactly when their canonical
//! strings are equal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical string of the native asset.
pub const NATIVE_ASSET: &str = "native";

/// An account on the ledger, identified by its public address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps an account address.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the account address.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// An asset that can be traded on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    /// The ledger's native asset
    Native,
    /// An asset issued by an account
    Issued {
        /// Asset code, e.g. `USD`
        code: String,
        /// Issuing account
        issuer: AccountId,
    },
}

impl Asset {
    /// Creates an issued asset.
    pub fn issued(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Issued {
            code: code.into(),
            issuer: AccountId::new(issuer),
        }
    }

    /// Returns the canonical string used as index key.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str(NATIVE_ASSET),
            Asset::Issued { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}

/// Error returned when an asset string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid asset string: {0:?}")]
pub struct ParseAssetError(pub String);

impl FromStr for Asset {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NATIVE_ASSET {
            return Ok(Asset::Native);
        }
        match s.split_once(':') {
            Some((code, issuer))
                if !code.is_empty()
                    && code.len() <= 12
                    && code.chars().all(|c| c.is_ascii_alphanumeric())
                    && !issuer.is_empty()
                    && !issuer.contains(':') =>
            {
                Ok(Asset::issued(code, issuer))
            }
            _ => Err(ParseAssetError(s.to_string())),
        }
    }
}

impl Serialize for Asset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_strings() {
        assert_eq!(Asset::Native.canonical(), "native");
        assert_eq!(Asset::issued("USD", "GISSUER").canonical(), "USD:GISSUER");
    }

    #[test]
    fn test_parse_round_trip() {
        let usd: Asset = "USD:GISSUER".parse().expect("valid asset");
        assert_eq!(usd, Asset::issued("USD", "GISSUER"));
        assert_eq!("native".parse::<Asset>(), Ok(Asset::Native));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Asset>().is_err());
        assert!("USD".parse::<Asset>().is_err());
        assert!(":GISSUER".parse::<Asset>().is_err());
        assert!("TOOLONGASSETCODE:G".parse::<Asset>().is_err());
        assert!("USD:G:X".parse::<Asset>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&Asset::issued("EUR", "GBANK")).expect("serialize");
        assert_eq!(json, "\"EUR:GBANK\"");
        let back: Asset = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Asset::issued("EUR", "GBANK"));
    }
}
