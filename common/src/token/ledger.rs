//! Base ledger: balances, allowances, supply and supply cap
//!
//! The core knows nothing about locks, blacklists or pauses. Callers pass
//! in the amount an account may currently move; every operation computes
//! all new values before writing any of them, so an error never leaves a
//! partial update behind.

use std::collections::HashMap;

use log::trace;

use crate::config::UNLIMITED_ALLOWANCE;
use crate::crypto::Address;

use super::{Amount, LedgerError, LedgerResult};

#[derive(Debug, Clone, Default)]
pub struct LedgerCore {
    balances: HashMap<Address, Amount>,
    // owner -> spender -> amount
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    total_supply: Amount,
    max_supply: Amount,
}

impl LedgerCore {
    pub fn new(max_supply: Amount) -> Self {
        Self {
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            max_supply,
        }
    }

    // ========================================
    // Reads
    // ========================================

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    pub fn remaining_mintable(&self) -> Amount {
        self.max_supply.saturating_sub(self.total_supply)
    }

    /// Accounts holding a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    // ========================================
    // Supply
    // ========================================

    pub fn mint(&mut self, to: &Address, amount: Amount) -> LedgerResult<()> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if new_supply > self.max_supply {
            return Err(LedgerError::SupplyCapExceeded {
                max: self.max_supply,
                would_have: new_supply,
            });
        }
        // Cannot overflow: the balance is bounded by the supply
        let new_balance = self.balance_of(to) + amount;

        self.set_balance(to, new_balance);
        self.total_supply = new_supply;

        if log::log_enabled!(log::Level::Trace) {
            trace!("minted {} to {}, supply {}", amount, to, new_supply);
        }
        Ok(())
    }

    /// Destroy `amount` from `from`, `transferable` being what `from` may move now
    pub fn burn(&mut self, from: &Address, amount: Amount, transferable: Amount) -> LedgerResult<()> {
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        Self::ensure_transferable(from, amount, transferable)?;

        let new_balance = self.balance_of(from).checked_sub(amount).ok_or(
            LedgerError::InsufficientTransferable {
                account: *from,
                need: amount,
                have: transferable,
            },
        )?;
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, new_balance);
        self.total_supply = new_supply;

        if log::log_enabled!(log::Level::Trace) {
            trace!("burned {} from {}, supply {}", amount, from, new_supply);
        }
        Ok(())
    }

    /// Replace the supply cap, returning the previous one
    pub fn set_max_supply(&mut self, new_max_supply: Amount) -> LedgerResult<Amount> {
        if new_max_supply < self.total_supply {
            return Err(LedgerError::CapBelowSupply {
                requested: new_max_supply,
                total_supply: self.total_supply,
            });
        }
        let old = self.max_supply;
        self.max_supply = new_max_supply;
        Ok(old)
    }

    // ========================================
    // Transfers
    // ========================================

    /// Move `amount` from `from` to `to`, `transferable` being what `from` may move now
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        transferable: Amount,
    ) -> LedgerResult<()> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Self::ensure_transferable(from, amount, transferable)?;

        if from == to || amount == 0 {
            return Ok(());
        }

        // Phase 1: compute both balances
        let new_from = self.balance_of(from).checked_sub(amount).ok_or(
            LedgerError::InsufficientTransferable {
                account: *from,
                need: amount,
                have: transferable,
            },
        )?;
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        // Phase 2: write
        self.set_balance(from, new_from);
        self.set_balance(to, new_to);

        if log::log_enabled!(log::Level::Trace) {
            trace!("transferred {} from {} to {}", amount, from, to);
        }
        Ok(())
    }

    // ========================================
    // Allowances
    // ========================================

    /// Set (not add to) the allowance of `spender` over `owner` funds
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        if amount == 0 {
            if let Some(spenders) = self.allowances.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.allowances.remove(owner);
                }
            }
        } else {
            self.allowances
                .entry(*owner)
                .or_default()
                .insert(*spender, amount);
        }
        Ok(())
    }

    /// Fail unless `spender` may spend `amount` of `owner` funds
    pub fn check_allowance(&self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        let current = self.allowance(owner, spender);
        if current < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                need: amount,
                have: current,
            });
        }
        Ok(())
    }

    /// Consume `amount` of the allowance, an unlimited allowance is left untouched
    pub fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) -> LedgerResult<()> {
        self.check_allowance(owner, spender, amount)?;

        let current = self.allowance(owner, spender);
        if current == UNLIMITED_ALLOWANCE {
            return Ok(());
        }
        self.approve(owner, spender, current - amount)
    }

    fn ensure_transferable(account: &Address, amount: Amount, transferable: Amount) -> LedgerResult<()> {
        if amount > transferable {
            return Err(LedgerError::InsufficientTransferable {
                account: *account,
                need: amount,
                have: transferable,
            });
        }
        Ok(())
    }

    fn set_balance(&mut self, account: &Address, balance: Amount) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
    }
}
