//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the proxy sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod fmt;
pub mod geometry;
pub mod serde_util;

pub use geometry::{Point, Viewport};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── WalletId ────────────────────────────────────────────────────────────────

/// Wallet address identifying one counterparty (e.g. `"0x4c2e…9a1f"`).
///
/// This is the node identity in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WalletId(String);

impl WalletId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for labels: `0x1234…abcd`.
    pub fn short(&self) -> String {
        short_address(&self.0)
    }
}

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WalletId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for WalletId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WalletId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(WalletId(s))
    }
}

// ─── TradeId ─────────────────────────────────────────────────────────────────

/// Identifier shared by both legs of one trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeId(String);

impl TradeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TradeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for TradeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TradeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TradeId(s))
    }
}

// ─── Direction ───────────────────────────────────────────────────────────────

/// Which side of a trade a leg is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "Buy"),
            Direction::Sell => write!(f, "Sell"),
        }
    }
}

// ─── InstrumentType ──────────────────────────────────────────────────────────

/// Instrument family a trade-history query is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    #[default]
    Perp,
    Option,
    Erc20,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perp => "perp",
            Self::Option => "option",
            Self::Erc20 => "erc20",
        }
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── TxStatus ────────────────────────────────────────────────────────────────

/// Settlement status filter for trade-history queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Requested,
    Pending,
    #[default]
    Settled,
    Reverted,
    Ignored,
    TimedOut,
}

// ─── Utilities ───────────────────────────────────────────────────────────────

/// Shorten an address for display: first 6 and last 4 characters.
///
/// Addresses of 12 characters or fewer are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x4c2e1d7f8a9b0c3d4e5f6a7b8c9d0e1f2a3b9a1f"),
            "0x4c2e…9a1f"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_wallet_id_serde() {
        let id = WalletId::from("0xabc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0xabc\"");
        let back: WalletId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_direction_serde() {
        let buy: Direction = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(buy, Direction::Buy);
        let sell: Direction = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(sell, Direction::Sell);
        assert!(serde_json::from_str::<Direction>("\"hold\"").is_err());
    }

    #[test]
    fn test_tx_status_serde() {
        let s: TxStatus = serde_json::from_str("\"timed_out\"").unwrap();
        assert_eq!(s, TxStatus::TimedOut);
        assert_eq!(serde_json::to_string(&TxStatus::Settled).unwrap(), "\"settled\"");
    }

    #[test]
    fn test_instrument_type_as_str() {
        let t: InstrumentType = serde_json::from_str("\"erc20\"").unwrap();
        assert_eq!(t.as_str(), "erc20");
    }
}
