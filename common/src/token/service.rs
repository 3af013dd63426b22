//! Token service
//!
//! Orchestrates the ledger components for every public call. Each mutating
//! call runs its checks in a fixed order:
//!
//! 1. owner authorization (owner-only calls)
//! 2. pause switches
//! 3. blacklist, for every role the call touches
//! 4. input validation
//! 5. balance, allowance and supply cap
//!
//! and only then writes. A rejected call leaves the state exactly as it was
//! and returns the error; an accepted one returns the events it produced.

use log::{debug, info, warn};

use crate::config::TOKEN_DECIMALS;
use crate::crypto::{Address, Hash};
use crate::time::{Clock, TimestampSeconds};

use super::{
    AccessControl, Amount, BalanceInfo, ComplianceGate, Effects, LedgerCore, LedgerError,
    LedgerEvent, LedgerResult, LockVault, TokenInfo, TokenParams,
};

pub struct TokenService<C: Clock> {
    name: String,
    symbol: String,
    nda_hash: Hash,
    ledger: LedgerCore,
    compliance: ComplianceGate,
    vault: LockVault,
    access: AccessControl,
    paused: bool,
    minting_paused: bool,
    clock: C,
    // Highest timestamp observed by a mutating call
    last_timestamp: TimestampSeconds,
}

impl<C: Clock> TokenService<C> {
    /// Deploy a new ledger owned by `deployer`
    ///
    /// The initial supply is minted to the deployer and reported the same
    /// way as a regular mint.
    pub fn new(params: TokenParams, deployer: Address, clock: C) -> LedgerResult<(Self, Effects)> {
        params.validate()?;
        let access = AccessControl::new(deployer)?;

        let mut ledger = LedgerCore::new(params.max_supply);
        let mut effects = Effects::new();
        if params.initial_supply > 0 {
            ledger.mint(&deployer, params.initial_supply)?;
            effects.push(LedgerEvent::Transfer {
                from: Address::zero(),
                to: deployer,
                amount: params.initial_supply,
            });
            effects.push(LedgerEvent::TokensMinted {
                to: deployer,
                amount: params.initial_supply,
            });
        }

        let last_timestamp = clock.now();
        info!(
            "deployed {} ({}) owned by {}, supply {} / {}",
            params.name, params.symbol, deployer, params.initial_supply, params.max_supply
        );

        let service = Self {
            name: params.name,
            symbol: params.symbol,
            nda_hash: params.nda_hash,
            ledger,
            compliance: ComplianceGate::new(),
            vault: LockVault::new(),
            access,
            paused: false,
            minting_paused: false,
            clock,
            last_timestamp,
        };
        Ok((service, effects))
    }

    // ========================================
    // Time
    // ========================================

    /// Current time as seen by the ledger, never earlier than a previous call
    pub fn now(&self) -> TimestampSeconds {
        self.clock.now().max(self.last_timestamp)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // Read the clock for a mutating call and remember it
    fn tick(&mut self) -> TimestampSeconds {
        let observed = self.clock.now();
        if observed < self.last_timestamp {
            if log::log_enabled!(log::Level::Warn) {
                warn!(
                    "clock went backwards ({} < {}), keeping last timestamp",
                    observed, self.last_timestamp
                );
            }
            return self.last_timestamp;
        }
        self.last_timestamp = observed;
        observed
    }

    // ========================================
    // Guards
    // ========================================

    fn ensure_not_paused(&self) -> LedgerResult<()> {
        if self.paused {
            return Err(LedgerError::TransfersPaused);
        }
        Ok(())
    }

    fn transferable_at(&self, account: &Address, now: TimestampSeconds) -> Amount {
        self.vault
            .transferable(account, self.ledger.balance_of(account), now)
    }

    // ========================================
    // Supply
    // ========================================

    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        self.ensure_not_paused()?;
        if self.minting_paused {
            return Err(LedgerError::MintingPaused);
        }
        self.compliance.ensure_allowed(&[to])?;

        self.ledger.mint(to, amount)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("minted {} to {}", amount, to);
        }
        Ok(vec![
            LedgerEvent::Transfer {
                from: Address::zero(),
                to: *to,
                amount,
            },
            LedgerEvent::TokensMinted { to: *to, amount },
        ])
    }

    /// Burn from the caller's own transferable balance
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> LedgerResult<Effects> {
        self.ensure_not_paused()?;
        self.compliance.ensure_allowed(&[caller])?;
        self.burn_transferable(caller, amount)
    }

    /// Owner burn from any account, locked tokens stay untouched
    pub fn burn_from(&mut self, caller: &Address, account: &Address, amount: Amount) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        self.ensure_not_paused()?;
        self.compliance.ensure_allowed(&[account])?;
        self.burn_transferable(account, amount)
    }

    fn burn_transferable(&mut self, account: &Address, amount: Amount) -> LedgerResult<Effects> {
        let now = self.tick();
        let transferable = self.transferable_at(account, now);
        self.ledger.burn(account, amount, transferable)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("burned {} from {}", amount, account);
        }
        Ok(vec![
            LedgerEvent::Transfer {
                from: *account,
                to: Address::zero(),
                amount,
            },
            LedgerEvent::TokensBurned {
                from: *account,
                amount,
            },
        ])
    }

    pub fn set_max_supply(&mut self, caller: &Address, new_max_supply: Amount) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        let old = self.ledger.set_max_supply(new_max_supply)?;

        info!("max supply updated from {} to {}", old, new_max_supply);
        Ok(vec![LedgerEvent::MaxSupplyUpdated {
            old,
            new: new_max_supply,
        }])
    }

    // ========================================
    // Transfers & allowances
    // ========================================

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> LedgerResult<Effects> {
        self.ensure_not_paused()?;
        self.compliance.ensure_allowed(&[caller, to])?;

        let now = self.tick();
        let transferable = self.transferable_at(caller, now);
        self.ledger.transfer(caller, to, amount, transferable)?;

        Ok(vec![LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        }])
    }

    /// Move `amount` of `from` funds to `to` on behalf of `caller`
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<Effects> {
        self.ensure_not_paused()?;
        self.compliance.ensure_allowed(&[from, to, caller])?;
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        // Phase 1: every check that can fail
        self.ledger.check_allowance(from, caller, amount)?;
        let now = self.tick();
        let transferable = self.transferable_at(from, now);

        // Phase 2: the transfer validates its own balance before writing,
        // after which spending the checked allowance cannot fail
        self.ledger.transfer(from, to, amount, transferable)?;
        self.ledger.spend_allowance(from, caller, amount)?;

        Ok(vec![LedgerEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        }])
    }

    /// Set the allowance of `spender` over the caller's funds
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> LedgerResult<Effects> {
        self.compliance.ensure_allowed(&[caller, spender])?;
        self.ledger.approve(caller, spender, amount)?;

        Ok(vec![LedgerEvent::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        }])
    }

    // ========================================
    // Time locks
    // ========================================

    /// Send `amount` of the owner's tokens to `to`, locked for `lock_days` days
    pub fn distribute_locked(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
        lock_days: u64,
    ) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        self.ensure_not_paused()?;
        self.compliance.ensure_allowed(&[caller, to])?;

        // Phase 1: validate and compute, nothing is written yet
        let now = self.tick();
        let plan = self.vault.plan_lock(to, amount, lock_days, now)?;
        let available = self.transferable_at(caller, now);
        if available < amount {
            return Err(LedgerError::InsufficientOwnerBalance {
                need: amount,
                have: available,
            });
        }

        // Phase 2: move the tokens, then lock them on the recipient
        self.ledger.transfer(caller, to, amount, available)?;
        self.vault.commit_lock(&plan);

        let mut effects = Effects::new();
        if let Some(settled) = plan.settled {
            effects.push(LedgerEvent::Unlocked {
                to: *to,
                amount: settled,
            });
        }
        effects.push(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        effects.push(LedgerEvent::Locked {
            to: *to,
            amount,
            release_time: plan.record.release_time,
        });
        if let Some(old_release) = plan.previous_release {
            effects.push(LedgerEvent::LockExtended {
                to: *to,
                old_release,
                new_release: plan.record.release_time,
            });
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "distributed {} locked until {} to {}",
                amount, plan.record.release_time, to
            );
        }
        Ok(effects)
    }

    /// Settle the expired lock of `account`
    pub fn unlock_expired(&mut self, caller: &Address, account: &Address) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        let now = self.tick();
        let amount = self.vault.unlock_expired(account, now)?;

        Ok(vec![LedgerEvent::Unlocked {
            to: *account,
            amount,
        }])
    }

    // ========================================
    // Compliance
    // ========================================

    pub fn set_blacklist(&mut self, caller: &Address, account: &Address, flag: bool) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        self.compliance.set_blacklist(account, flag)?;

        Ok(vec![LedgerEvent::BlacklistUpdated {
            account: *account,
            flag,
        }])
    }

    pub fn set_blacklist_batch(
        &mut self,
        caller: &Address,
        accounts: &[Address],
        flag: bool,
    ) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        let changed = self.compliance.set_blacklist_batch(accounts, flag)?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "blacklist batch of {} set to {} ({} changed)",
                accounts.len(),
                flag,
                changed
            );
        }
        Ok(vec![LedgerEvent::BlacklistBatchUpdated {
            accounts: accounts.to_vec(),
            flag,
        }])
    }

    // ========================================
    // Administration
    // ========================================

    pub fn pause(&mut self, caller: &Address) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        if self.paused {
            return Ok(Effects::new());
        }
        self.paused = true;
        info!("transfers paused by {}", caller);
        Ok(vec![LedgerEvent::Paused { actor: *caller }])
    }

    pub fn unpause(&mut self, caller: &Address) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        if !self.paused {
            return Ok(Effects::new());
        }
        self.paused = false;
        info!("transfers unpaused by {}", caller);
        Ok(vec![LedgerEvent::Unpaused { actor: *caller }])
    }

    pub fn pause_minting(&mut self, caller: &Address) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        if self.minting_paused {
            return Ok(Effects::new());
        }
        self.minting_paused = true;
        info!("minting paused by {}", caller);
        Ok(vec![LedgerEvent::MintingPaused { actor: *caller }])
    }

    pub fn resume_minting(&mut self, caller: &Address) -> LedgerResult<Effects> {
        self.access.only_owner(caller)?;
        if !self.minting_paused {
            return Ok(Effects::new());
        }
        self.minting_paused = false;
        info!("minting resumed by {}", caller);
        Ok(vec![LedgerEvent::MintingResumed { actor: *caller }])
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> LedgerResult<Effects> {
        let previous = self.access.transfer_ownership(caller, new_owner)?;

        info!("ownership transferred from {} to {}", previous, new_owner);
        Ok(vec![LedgerEvent::OwnershipTransferred {
            previous,
            new: *new_owner,
        }])
    }

    // ========================================
    // Reads
    // ========================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn max_supply(&self) -> Amount {
        self.ledger.max_supply()
    }

    pub fn remaining_mintable(&self) -> Amount {
        self.ledger.remaining_mintable()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn balances_of(&self, accounts: &[Address]) -> Vec<Amount> {
        accounts.iter().map(|a| self.balance_of(a)).collect()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn locked_balance_of(&self, account: &Address) -> Amount {
        self.vault.locked_balance_of(account, self.now())
    }

    pub fn locked_balances_of(&self, accounts: &[Address]) -> Vec<Amount> {
        let now = self.now();
        accounts
            .iter()
            .map(|a| self.vault.locked_balance_of(a, now))
            .collect()
    }

    /// Stored release time, still reported after expiry until settled
    pub fn lock_release_time_of(&self, account: &Address) -> TimestampSeconds {
        self.vault.release_time_of(account)
    }

    pub fn transferable_balance_of(&self, account: &Address) -> Amount {
        self.transferable_at(account, self.now())
    }

    pub fn transferable_balances_of(&self, accounts: &[Address]) -> Vec<Amount> {
        let now = self.now();
        accounts
            .iter()
            .map(|a| self.transferable_at(a, now))
            .collect()
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.compliance.is_blacklisted(account)
    }

    pub fn are_blacklisted(&self, accounts: &[Address]) -> Vec<bool> {
        self.compliance.are_blacklisted(accounts)
    }

    pub fn blacklist_count(&self) -> usize {
        self.compliance.count()
    }

    pub fn balance_info(&self, account: &Address) -> BalanceInfo {
        let now = self.now();
        let balance = self.ledger.balance_of(account);
        let locked = self.vault.locked_balance_of(account, now);
        BalanceInfo {
            balance,
            locked,
            transferable: balance.saturating_sub(locked),
            release_time: self.vault.release_time_of(account),
        }
    }

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: TOKEN_DECIMALS,
            total_supply: self.ledger.total_supply(),
            max_supply: self.ledger.max_supply(),
            remaining_mintable: self.ledger.remaining_mintable(),
            nda_hash: self.nda_hash,
        }
    }

    pub fn nda_hash(&self) -> &Hash {
        &self.nda_hash
    }

    pub fn verify_nda_compliance(&self, candidate: &Hash) -> bool {
        self.nda_hash == *candidate
    }

    pub fn owner(&self) -> &Address {
        self.access.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_minting_paused(&self) -> bool {
        self.minting_paused
    }

    /// Every account holding tokens, in no particular order
    pub fn holders(&self) -> Vec<Address> {
        self.ledger.holders().map(|(account, _)| *account).collect()
    }
}
