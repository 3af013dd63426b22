//! Token Types
//!
//! Core data structures shared by the ledger components.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_INITIAL_SUPPLY, DEFAULT_MAX_SUPPLY, DEFAULT_NDA_CONTENT, DEFAULT_TOKEN_NAME,
    DEFAULT_TOKEN_SYMBOL, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH,
};
use crate::crypto::{hash, Hash};
use crate::time::TimestampSeconds;

use super::{LedgerError, LedgerResult};

/// Token quantity in base units (18 decimals)
pub type Amount = u128;

// ===== Token Lock =====

/// Stored time-lock bucket of an account
///
/// The record is only cleared by an explicit settlement. Whether the
/// tokens are still locked is derived from the record and the current
/// time, see [`LockRecord::effective_amount`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Locked amount as stored
    pub amount: Amount,
    /// Unix timestamp when the whole bucket is released (0 = no lock)
    pub release_time: TimestampSeconds,
}

impl LockRecord {
    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.release_time == 0
    }

    /// Whether the stored lock still restricts transfers at `now`
    pub fn is_active(&self, now: TimestampSeconds) -> bool {
        self.release_time != 0 && now < self.release_time
    }

    /// Whether a stored lock exists but its release time has passed
    pub fn is_expired(&self, now: TimestampSeconds) -> bool {
        self.release_time != 0 && now >= self.release_time
    }

    /// Amount that is still locked at `now`
    pub fn effective_amount(&self, now: TimestampSeconds) -> Amount {
        if self.is_active(now) {
            self.amount
        } else {
            0
        }
    }
}

// ===== Deployment =====

/// Deployment parameters, validated once when the ledger is created
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    /// Token name
    pub name: String,
    /// Token symbol/ticker
    pub symbol: String,
    /// Supply minted to the deployer
    pub initial_supply: Amount,
    /// Initial supply cap
    pub max_supply: Amount,
    /// Hash of the NDA document holders agree to
    pub nda_hash: Hash,
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_owned(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_owned(),
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            max_supply: DEFAULT_MAX_SUPPLY,
            nda_hash: hash(DEFAULT_NDA_CONTENT.as_bytes()),
        }
    }
}

impl TokenParams {
    /// Check every deployment invariant
    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.is_empty() {
            return Err(LedgerError::InvalidMetadata("name cannot be empty".into()));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(LedgerError::InvalidMetadata(format!(
                "name longer than {} bytes",
                MAX_NAME_LENGTH
            )));
        }
        if self.symbol.is_empty() {
            return Err(LedgerError::InvalidMetadata(
                "symbol cannot be empty".into(),
            ));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(LedgerError::InvalidMetadata(format!(
                "symbol longer than {} bytes",
                MAX_SYMBOL_LENGTH
            )));
        }
        if self.nda_hash.is_zero() {
            return Err(LedgerError::InvalidNdaHash);
        }
        if self.initial_supply > self.max_supply {
            return Err(LedgerError::SupplyCapExceeded {
                max: self.max_supply,
                would_have: self.initial_supply,
            });
        }
        Ok(())
    }
}

// ===== Read Models =====

/// Per-account view exposed by `balance_info`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInfo {
    /// Total balance, locked tokens included
    pub balance: Amount,
    /// Amount still locked at query time
    pub locked: Amount,
    /// Amount movable at query time
    pub transferable: Amount,
    /// Stored release time (0 = no lock)
    pub release_time: TimestampSeconds,
}

/// Ledger-wide view exposed by `token_info`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub max_supply: Amount,
    pub remaining_mintable: Amount,
    pub nda_hash: Hash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_record_lazy_expiry() {
        let lock = LockRecord {
            amount: 100,
            release_time: 1_000,
        };
        assert_eq!(lock.effective_amount(999), 100);
        assert_eq!(lock.effective_amount(1_000), 0);
        assert_eq!(lock.effective_amount(5_000), 0);
        assert!(lock.is_active(999));
        assert!(lock.is_expired(1_000));
    }

    #[test]
    fn test_lock_record_without_release_time_is_unlocked() {
        let lock = LockRecord {
            amount: 100,
            release_time: 0,
        };
        assert_eq!(lock.effective_amount(0), 0);
        assert!(!lock.is_expired(0));
        assert!(LockRecord::default().is_empty());
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(TokenParams::default().validate().is_ok());
    }

    #[test]
    fn test_params_validation() {
        let mut params = TokenParams::default();
        params.nda_hash = Hash::zero();
        assert_eq!(params.validate(), Err(LedgerError::InvalidNdaHash));

        let mut params = TokenParams::default();
        params.initial_supply = params.max_supply + 1;
        assert!(matches!(
            params.validate(),
            Err(LedgerError::SupplyCapExceeded { .. })
        ));

        let mut params = TokenParams::default();
        params.symbol = "S".repeat(MAX_SYMBOL_LENGTH + 1);
        assert!(matches!(
            params.validate(),
            Err(LedgerError::InvalidMetadata(_))
        ));

        let mut params = TokenParams::default();
        params.name.clear();
        assert!(matches!(
            params.validate(),
            Err(LedgerError::InvalidMetadata(_))
        ));
    }
}
