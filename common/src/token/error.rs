//! Ledger Error Codes
//!
//! Range: 0x0300 - 0x03FF
//! Format: LEDGER_ERROR_<CATEGORY>_<SPECIFIC>

use thiserror::Error;

use crate::crypto::Address;
use crate::time::TimestampSeconds;

use super::Amount;

// ===== Authorization Errors (0x0300 - 0x030F) =====

pub const LEDGER_ERROR_UNAUTHORIZED: u64 = 0x0300;

// ===== Validation Errors (0x0310 - 0x031F) =====

pub const LEDGER_ERROR_ZERO_ADDRESS: u64 = 0x0310;
pub const LEDGER_ERROR_ZERO_AMOUNT: u64 = 0x0311;
pub const LEDGER_ERROR_ZERO_DURATION: u64 = 0x0312;
pub const LEDGER_ERROR_INVALID_NDA_HASH: u64 = 0x0313;
pub const LEDGER_ERROR_INVALID_METADATA: u64 = 0x0314;
pub const LEDGER_ERROR_OVERFLOW: u64 = 0x0315;

// ===== Supply Errors (0x0320 - 0x032F) =====

pub const LEDGER_ERROR_SUPPLY_CAP_EXCEEDED: u64 = 0x0320;
pub const LEDGER_ERROR_CAP_BELOW_SUPPLY: u64 = 0x0321;

// ===== Balance Errors (0x0330 - 0x033F) =====

pub const LEDGER_ERROR_INSUFFICIENT_TRANSFERABLE: u64 = 0x0330;
pub const LEDGER_ERROR_INSUFFICIENT_ALLOWANCE: u64 = 0x0331;
pub const LEDGER_ERROR_INSUFFICIENT_OWNER_BALANCE: u64 = 0x0332;

// ===== Compliance Errors (0x0340 - 0x034F) =====

pub const LEDGER_ERROR_BLACKLISTED_ACCOUNT: u64 = 0x0340;
pub const LEDGER_ERROR_EMPTY_BATCH: u64 = 0x0341;
pub const LEDGER_ERROR_BATCH_TOO_LARGE: u64 = 0x0342;

// ===== Pause Errors (0x0350 - 0x035F) =====

pub const LEDGER_ERROR_TRANSFERS_PAUSED: u64 = 0x0350;
pub const LEDGER_ERROR_MINTING_PAUSED: u64 = 0x0351;

// ===== Timelock Errors (0x0360 - 0x036F) =====

pub const LEDGER_ERROR_LOCK_NOT_EXPIRED: u64 = 0x0360;
pub const LEDGER_ERROR_NO_LOCKED_TOKENS: u64 = 0x0361;

/// Failure of a single ledger call
///
/// A call that returns an error has not modified the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Unauthorized account {caller}")]
    Unauthorized { caller: Address },

    #[error("Address cannot be zero")]
    ZeroAddress,

    #[error("Amount must be greater than 0")]
    ZeroAmount,

    #[error("Lock period must be greater than 0")]
    ZeroDuration,

    #[error("Would exceed max supply: max {max}, would have {would_have}")]
    SupplyCapExceeded { max: Amount, would_have: Amount },

    #[error("Max supply must be >= current supply: requested {requested}, supply {total_supply}")]
    CapBelowSupply {
        requested: Amount,
        total_supply: Amount,
    },

    #[error("Insufficient transferable balance for {account}: need {need}, have {have}")]
    InsufficientTransferable {
        account: Address,
        need: Amount,
        have: Amount,
    },

    #[error("Insufficient allowance from {owner} to {spender}: need {need}, have {have}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        need: Amount,
        have: Amount,
    },

    #[error("Insufficient balance to distribute: need {need}, have {have}")]
    InsufficientOwnerBalance { need: Amount, have: Amount },

    #[error("Account {account} is blacklisted")]
    BlacklistedAccount { account: Address },

    #[error("Empty accounts array")]
    EmptyBatch,

    #[error("Too many accounts: {size} (max {max})")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Transfers are paused")]
    TransfersPaused,

    #[error("Minting is paused")]
    MintingPaused,

    #[error("Lock of {account} has not expired: releases at {release_time}, now {now}")]
    LockNotExpired {
        account: Address,
        release_time: TimestampSeconds,
        now: TimestampSeconds,
    },

    #[error("No locked tokens for {account}")]
    NoLockedTokens { account: Address },

    #[error("NDA hash cannot be zero")]
    InvalidNdaHash,

    #[error("Invalid token metadata: {0}")]
    InvalidMetadata(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Convert error to u64 error code
    pub fn to_code(&self) -> u64 {
        match self {
            Self::Unauthorized { .. } => LEDGER_ERROR_UNAUTHORIZED,
            Self::ZeroAddress => LEDGER_ERROR_ZERO_ADDRESS,
            Self::ZeroAmount => LEDGER_ERROR_ZERO_AMOUNT,
            Self::ZeroDuration => LEDGER_ERROR_ZERO_DURATION,
            Self::SupplyCapExceeded { .. } => LEDGER_ERROR_SUPPLY_CAP_EXCEEDED,
            Self::CapBelowSupply { .. } => LEDGER_ERROR_CAP_BELOW_SUPPLY,
            Self::InsufficientTransferable { .. } => LEDGER_ERROR_INSUFFICIENT_TRANSFERABLE,
            Self::InsufficientAllowance { .. } => LEDGER_ERROR_INSUFFICIENT_ALLOWANCE,
            Self::InsufficientOwnerBalance { .. } => LEDGER_ERROR_INSUFFICIENT_OWNER_BALANCE,
            Self::BlacklistedAccount { .. } => LEDGER_ERROR_BLACKLISTED_ACCOUNT,
            Self::EmptyBatch => LEDGER_ERROR_EMPTY_BATCH,
            Self::BatchTooLarge { .. } => LEDGER_ERROR_BATCH_TOO_LARGE,
            Self::TransfersPaused => LEDGER_ERROR_TRANSFERS_PAUSED,
            Self::MintingPaused => LEDGER_ERROR_MINTING_PAUSED,
            Self::LockNotExpired { .. } => LEDGER_ERROR_LOCK_NOT_EXPIRED,
            Self::NoLockedTokens { .. } => LEDGER_ERROR_NO_LOCKED_TOKENS,
            Self::InvalidNdaHash => LEDGER_ERROR_INVALID_NDA_HASH,
            Self::InvalidMetadata(_) => LEDGER_ERROR_INVALID_METADATA,
            Self::Overflow => LEDGER_ERROR_OVERFLOW,
        }
    }

    /// Stable identifier of the error kind, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "Unauthorized",
            Self::ZeroAddress => "ZeroAddress",
            Self::ZeroAmount => "ZeroAmount",
            Self::ZeroDuration => "ZeroDuration",
            Self::SupplyCapExceeded { .. } => "SupplyCapExceeded",
            Self::CapBelowSupply { .. } => "CapBelowSupply",
            Self::InsufficientTransferable { .. } => "InsufficientTransferable",
            Self::InsufficientAllowance { .. } => "InsufficientAllowance",
            Self::InsufficientOwnerBalance { .. } => "InsufficientOwnerBalance",
            Self::BlacklistedAccount { .. } => "BlacklistedAccount",
            Self::EmptyBatch => "EmptyBatch",
            Self::BatchTooLarge { .. } => "BatchTooLarge",
            Self::TransfersPaused => "TransfersPaused",
            Self::MintingPaused => "MintingPaused",
            Self::LockNotExpired { .. } => "LockNotExpired",
            Self::NoLockedTokens { .. } => "NoLockedTokens",
            Self::InvalidNdaHash => "InvalidNdaHash",
            Self::InvalidMetadata(_) => "InvalidMetadata",
            Self::Overflow => "Overflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_errors() -> Vec<LedgerError> {
        let a = Address::from_label("a");
        vec![
            LedgerError::Unauthorized { caller: a },
            LedgerError::ZeroAddress,
            LedgerError::ZeroAmount,
            LedgerError::ZeroDuration,
            LedgerError::SupplyCapExceeded {
                max: 1,
                would_have: 2,
            },
            LedgerError::CapBelowSupply {
                requested: 1,
                total_supply: 2,
            },
            LedgerError::InsufficientTransferable {
                account: a,
                need: 2,
                have: 1,
            },
            LedgerError::InsufficientAllowance {
                owner: a,
                spender: a,
                need: 2,
                have: 1,
            },
            LedgerError::InsufficientOwnerBalance { need: 2, have: 1 },
            LedgerError::BlacklistedAccount { account: a },
            LedgerError::EmptyBatch,
            LedgerError::BatchTooLarge { size: 101, max: 100 },
            LedgerError::TransfersPaused,
            LedgerError::MintingPaused,
            LedgerError::LockNotExpired {
                account: a,
                release_time: 10,
                now: 5,
            },
            LedgerError::NoLockedTokens { account: a },
            LedgerError::InvalidNdaHash,
            LedgerError::InvalidMetadata("name".into()),
            LedgerError::Overflow,
        ]
    }

    #[test]
    fn test_codes_are_unique_and_in_range() {
        let errors = all_errors();
        let codes: HashSet<u64> = errors.iter().map(LedgerError::to_code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| (0x0300..=0x03FF).contains(c)));
    }

    #[test]
    fn test_kinds_are_unique() {
        let errors = all_errors();
        let kinds: HashSet<&str> = errors.iter().map(LedgerError::kind).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_display_carries_context() {
        let err = LedgerError::BatchTooLarge { size: 101, max: 100 };
        assert_eq!(err.to_string(), "Too many accounts: 101 (max 100)");
    }
}
