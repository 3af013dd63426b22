use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

use super::hash::{decode_hex_32, hash, HASH_SIZE};

pub const ADDRESS_SIZE: usize = HASH_SIZE;

/// Account identifier on the ledger
///
/// The all-zero address is reserved: it represents "no account" (the
/// source of a mint, the sink of a burn) and can never hold a balance,
/// be blacklisted, or own the ledger.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    /// Derive an address from a human readable label
    ///
    /// Used by tooling and tests to get stable, distinct accounts.
    pub fn from_label(label: &str) -> Self {
        Address(hash(label.as_bytes()).to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex_32(s).map(Address)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "0x{}", &self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        decode_hex_32(&hex).map(Address).map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_distinct_and_stable() {
        let a = Address::from_label("user1");
        let b = Address::from_label("user2");
        assert_ne!(a, b);
        assert_eq!(a, Address::from_label("user1"));
        assert!(!a.is_zero());
    }

    #[test]
    fn test_display_and_parse() {
        let a = Address::from_label("owner");
        let shown = a.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(Address::from_str(&shown).unwrap(), a);
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::zero().is_zero());
        assert_eq!(Address::default(), Address::zero());
    }
}
