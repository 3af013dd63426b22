// Single-owner authorization

use log::warn;

use crate::crypto::Address;

use super::{LedgerError, LedgerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    pub fn new(owner: Address) -> LedgerResult<Self> {
        if owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.owner == *account
    }

    /// Fail with `Unauthorized` unless `caller` is the owner
    pub fn only_owner(&self, caller: &Address) -> LedgerResult<()> {
        if !self.is_owner(caller) {
            if log::log_enabled!(log::Level::Warn) {
                warn!("rejected owner-only call from {}", caller);
            }
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> LedgerResult<Address> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, *new_owner))
    }
}
