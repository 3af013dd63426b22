//! Address blacklist
//!
//! Membership is a set, so the live count cannot drift from the number of
//! flagged accounts whatever order flags are set in.

use std::collections::HashSet;

use log::debug;

use crate::config::MAX_BLACKLIST_BATCH;
use crate::crypto::Address;

use super::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Default)]
pub struct ComplianceGate {
    blacklisted: HashSet<Address>,
}

impl ComplianceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.blacklisted.contains(account)
    }

    pub fn are_blacklisted(&self, accounts: &[Address]) -> Vec<bool> {
        accounts.iter().map(|a| self.is_blacklisted(a)).collect()
    }

    pub fn count(&self) -> usize {
        self.blacklisted.len()
    }

    /// Flag or unflag one account, returns whether the flag changed
    pub fn set_blacklist(&mut self, account: &Address, flag: bool) -> LedgerResult<bool> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(self.apply(account, flag))
    }

    /// Flag or unflag every account of the batch, or none of them
    ///
    /// Returns how many accounts actually changed state.
    pub fn set_blacklist_batch(&mut self, accounts: &[Address], flag: bool) -> LedgerResult<usize> {
        Self::validate_batch(accounts)?;

        let mut changed = 0;
        for account in accounts {
            if self.apply(account, flag) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn validate_batch(accounts: &[Address]) -> LedgerResult<()> {
        if accounts.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        if accounts.len() > MAX_BLACKLIST_BATCH {
            return Err(LedgerError::BatchTooLarge {
                size: accounts.len(),
                max: MAX_BLACKLIST_BATCH,
            });
        }
        if accounts.iter().any(Address::is_zero) {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(())
    }

    /// Fail on the first flagged account among `accounts`
    ///
    /// The zero address stands for "no account" (mint source, burn sink)
    /// and is skipped.
    pub fn ensure_allowed(&self, accounts: &[&Address]) -> LedgerResult<()> {
        match accounts
            .iter()
            .find(|account| !account.is_zero() && self.is_blacklisted(account))
        {
            Some(account) => Err(LedgerError::BlacklistedAccount {
                account: **account,
            }),
            None => Ok(()),
        }
    }

    fn apply(&mut self, account: &Address, flag: bool) -> bool {
        let changed = if flag {
            self.blacklisted.insert(*account)
        } else {
            self.blacklisted.remove(account)
        };
        if changed && log::log_enabled!(log::Level::Debug) {
            debug!("blacklist flag of {} set to {}", account, flag);
        }
        changed
    }
}
