//! Ledger events
//!
//! Every mutating call returns the events it produced, in emission order.
//! The ledger itself never publishes them: indexing and log shipping are
//! left to whoever consumes the returned `Effects`.

use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::time::TimestampSeconds;

use super::Amount;

/// Events produced by a single successful call
pub type Effects = Vec<LedgerEvent>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Balance movement (mint: `from` is zero, burn: `to` is zero)
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// Allowance set by `owner` for `spender`
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    BlacklistUpdated {
        account: Address,
        flag: bool,
    },
    BlacklistBatchUpdated {
        accounts: Vec<Address>,
        flag: bool,
    },
    TokensMinted {
        to: Address,
        amount: Amount,
    },
    TokensBurned {
        from: Address,
        amount: Amount,
    },
    /// Tokens locked on `to`, `release_time` is the resulting release time
    Locked {
        to: Address,
        amount: Amount,
        release_time: TimestampSeconds,
    },
    /// A lock was added on top of an active one
    LockExtended {
        to: Address,
        old_release: TimestampSeconds,
        new_release: TimestampSeconds,
    },
    Unlocked {
        to: Address,
        amount: Amount,
    },
    Paused {
        actor: Address,
    },
    Unpaused {
        actor: Address,
    },
    MintingPaused {
        actor: Address,
    },
    MintingResumed {
        actor: Address,
    },
    MaxSupplyUpdated {
        old: Amount,
        new: Amount,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
}

impl LedgerEvent {
    /// Event name as exposed to indexers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
            Self::BlacklistUpdated { .. } => "BlacklistUpdated",
            Self::BlacklistBatchUpdated { .. } => "BlacklistBatchUpdated",
            Self::TokensMinted { .. } => "TokensMinted",
            Self::TokensBurned { .. } => "TokensBurned",
            Self::Locked { .. } => "Locked",
            Self::LockExtended { .. } => "LockExtended",
            Self::Unlocked { .. } => "Unlocked",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
            Self::MintingPaused { .. } => "MintingPaused",
            Self::MintingResumed { .. } => "MintingResumed",
            Self::MaxSupplyUpdated { .. } => "MaxSupplyUpdated",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let to = Address::from_label("alice");
        let event = LedgerEvent::TokensMinted {
            to,
            amount: u128::MAX,
        };
        // Amounts above u64 are written as plain integers
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            format!(
                r#"{{"tokens_minted":{{"to":"{}","amount":{}}}}}"#,
                to.to_hex(),
                u128::MAX
            )
        );

        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.name(), "TokensMinted");
    }
}
