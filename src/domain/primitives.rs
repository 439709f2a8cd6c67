//! Domain primitives: Address, Contract, TxId.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Flow account address: `0x` followed by 16 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid Flow address format: {0}")]
pub struct AddressParseError(pub String);

impl Address {
    pub const LEN: usize = 18;

    /// Wrap an address without validation. Prefer `FromStr`.
    pub fn new(addr: String) -> Self {
        Address(addr)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        if s.len() != Self::LEN || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError(s.to_string()));
        }
        Ok(Address(s.to_lowercase()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::from_str(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployed payout contract: account address plus contract name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Lower-cased, `0x`-prefixed. May be a placeholder such as `0xdeployer`.
    pub address: String,
    pub name: String,
}

impl Contract {
    pub fn new(address: &str, name: &str) -> Self {
        let address = address.trim().to_lowercase();
        let address = if address.starts_with("0x") {
            address
        } else {
            format!("0x{}", address)
        };
        Self {
            address,
            name: name.trim().to_string(),
        }
    }

    pub fn address_without_prefix(&self) -> &str {
        self.address.trim_start_matches("0x")
    }

    /// Fully qualified event type, e.g. `A.48d43b6b6f20d66b.SubscriptionManagerV2.SubscriptionPaid`.
    pub fn event_type(&self, event_name: &str) -> String {
        format!(
            "A.{}.{}.{}",
            self.address_without_prefix(),
            self.name,
            event_name
        )
    }
}

/// Transaction identifier returned by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for notices.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
