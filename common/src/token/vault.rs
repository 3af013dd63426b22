//! Time-locked balance buckets
//!
//! Each account has at most one lock bucket: an amount and a single
//! release time for the whole bucket. Expiry is lazy: once the release time
//! has passed the bucket no longer restricts transfers, but the stored
//! record stays until it is settled with `unlock_expired`.
//!
//! Locking is split in two steps, `plan_lock` validates and computes the
//! resulting record without touching storage, `commit_lock` writes it. The
//! service moves the tokens in between so that a failed transfer never
//! leaves a lock behind.

use std::collections::HashMap;

use log::debug;

use crate::config::SECONDS_PER_DAY;
use crate::crypto::Address;
use crate::time::TimestampSeconds;

use super::{Amount, LedgerError, LedgerResult, LockRecord};

/// Validated lock request, ready to be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPlan {
    pub account: Address,
    /// Amount added by this request
    pub amount: Amount,
    /// Expired bucket settled before locking, if any
    pub settled: Option<Amount>,
    /// Release time of the active bucket being extended, if any
    pub previous_release: Option<TimestampSeconds>,
    /// Record stored once committed
    pub record: LockRecord,
}

#[derive(Debug, Clone, Default)]
pub struct LockVault {
    locks: HashMap<Address, LockRecord>,
}

impl LockVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record, expired or not
    pub fn record(&self, account: &Address) -> LockRecord {
        self.locks.get(account).copied().unwrap_or_default()
    }

    /// Amount still locked at `now`
    pub fn locked_balance_of(&self, account: &Address, now: TimestampSeconds) -> Amount {
        self.record(account).effective_amount(now)
    }

    /// Stored release time, 0 once settled or if never locked
    pub fn release_time_of(&self, account: &Address) -> TimestampSeconds {
        self.record(account).release_time
    }

    /// Part of `balance` that `account` may move at `now`
    pub fn transferable(&self, account: &Address, balance: Amount, now: TimestampSeconds) -> Amount {
        balance.saturating_sub(self.locked_balance_of(account, now))
    }

    /// Compute the bucket resulting from locking `amount` for `lock_days` more days
    ///
    /// The release time only moves forward: it becomes the later of the
    /// current release time and `now + lock_days` days. The amount always
    /// accumulates. A bucket that has already expired is settled first and
    /// does not contribute to either.
    pub fn plan_lock(
        &self,
        account: &Address,
        amount: Amount,
        lock_days: u64,
        now: TimestampSeconds,
    ) -> LedgerResult<LockPlan> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if lock_days == 0 {
            return Err(LedgerError::ZeroDuration);
        }

        let candidate = lock_days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|secs| now.checked_add(secs))
            .ok_or(LedgerError::Overflow)?;

        let current = self.record(account);
        let (base, settled) = if current.is_expired(now) {
            (LockRecord::default(), Some(current.amount))
        } else {
            (current, None)
        };

        let previous_release = (base.release_time > 0).then_some(base.release_time);
        let record = LockRecord {
            amount: base.amount.checked_add(amount).ok_or(LedgerError::Overflow)?,
            release_time: base.release_time.max(candidate),
        };

        Ok(LockPlan {
            account: *account,
            amount,
            settled,
            previous_release,
            record,
        })
    }

    pub fn commit_lock(&mut self, plan: &LockPlan) {
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "lock of {} now {} until {} (added {})",
                plan.account, plan.record.amount, plan.record.release_time, plan.amount
            );
        }
        self.locks.insert(plan.account, plan.record);
    }

    /// Settle an expired bucket, returning the amount released
    pub fn unlock_expired(&mut self, account: &Address, now: TimestampSeconds) -> LedgerResult<Amount> {
        let current = self.record(account);
        if current.amount == 0 {
            return Err(LedgerError::NoLockedTokens { account: *account });
        }
        if now < current.release_time {
            return Err(LedgerError::LockNotExpired {
                account: *account,
                release_time: current.release_time,
                now,
            });
        }

        self.locks.remove(account);
        if log::log_enabled!(log::Level::Debug) {
            debug!("settled lock of {} ({} released)", account, current.amount);
        }
        Ok(current.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_PER_DAY;
    const NOW: TimestampSeconds = 1_700_000_000;

    fn lock(vault: &mut LockVault, account: &Address, amount: Amount, days: u64, now: u64) -> LockPlan {
        let plan = vault.plan_lock(account, amount, days, now).unwrap();
        vault.commit_lock(&plan);
        plan
    }

    #[test]
    fn test_plan_validation() {
        let vault = LockVault::new();
        let a = Address::from_label("a");
        assert_eq!(vault.plan_lock(&Address::zero(), 1, 1, NOW), Err(LedgerError::ZeroAddress));
        assert_eq!(vault.plan_lock(&a, 0, 1, NOW), Err(LedgerError::ZeroAmount));
        assert_eq!(vault.plan_lock(&a, 1, 0, NOW), Err(LedgerError::ZeroDuration));
        assert_eq!(vault.plan_lock(&a, 1, u64::MAX, NOW), Err(LedgerError::Overflow));
    }

    #[test]
    fn test_plan_does_not_write() {
        let vault = LockVault::new();
        let a = Address::from_label("a");
        vault.plan_lock(&a, 100, 30, NOW).unwrap();
        assert!(vault.record(&a).is_empty());
    }

    #[test]
    fn test_fresh_lock() {
        let mut vault = LockVault::new();
        let a = Address::from_label("a");
        let plan = lock(&mut vault, &a, 100, 30, NOW);

        assert_eq!(plan.previous_release, None);
        assert_eq!(plan.settled, None);
        assert_eq!(vault.release_time_of(&a), NOW + 30 * DAY);
        assert_eq!(vault.locked_balance_of(&a, NOW), 100);
        assert_eq!(vault.transferable(&a, 1_100, NOW), 1_000);
    }

    #[test]
    fn test_later_lock_extends_release() {
        let mut vault = LockVault::new();
        let a = Address::from_label("a");
        lock(&mut vault, &a, 100, 30, NOW);
        let plan = lock(&mut vault, &a, 50, 60, NOW + DAY);

        assert_eq!(plan.previous_release, Some(NOW + 30 * DAY));
        assert_eq!(vault.release_time_of(&a), NOW + DAY + 60 * DAY);
        assert_eq!(vault.locked_balance_of(&a, NOW + DAY), 150);
    }

    #[test]
    fn test_earlier_lock_keeps_release() {
        let mut vault = LockVault::new();
        let a = Address::from_label("a");
        lock(&mut vault, &a, 100, 60, NOW);
        let plan = lock(&mut vault, &a, 50, 10, NOW);

        assert_eq!(plan.previous_release, Some(NOW + 60 * DAY));
        assert_eq!(vault.release_time_of(&a), NOW + 60 * DAY);
        assert_eq!(vault.locked_balance_of(&a, NOW), 150);
    }

    #[test]
    fn test_lazy_expiry_and_settlement() {
        let mut vault = LockVault::new();
        let a = Address::from_label("a");
        lock(&mut vault, &a, 100, 30, NOW);

        let release = NOW + 30 * DAY;
        assert_eq!(vault.locked_balance_of(&a, release - 1), 100);
        assert_eq!(vault.locked_balance_of(&a, release), 0);
        assert_eq!(vault.transferable(&a, 1_100, release), 1_100);
        // Storage untouched by reads
        assert_eq!(vault.record(&a).amount, 100);

        assert_eq!(
            vault.unlock_expired(&a, release - 1),
            Err(LedgerError::LockNotExpired {
                account: a,
                release_time: release,
                now: release - 1
            })
        );
        assert_eq!(vault.unlock_expired(&a, release), Ok(100));
        assert!(vault.record(&a).is_empty());
        assert_eq!(
            vault.unlock_expired(&a, release),
            Err(LedgerError::NoLockedTokens { account: a })
        );
    }

    #[test]
    fn test_expired_bucket_is_settled_before_relocking() {
        let mut vault = LockVault::new();
        let a = Address::from_label("a");
        lock(&mut vault, &a, 100, 1, NOW);

        let later = NOW + 10 * DAY;
        let plan = lock(&mut vault, &a, 40, 5, later);

        assert_eq!(plan.settled, Some(100));
        assert_eq!(plan.previous_release, None);
        assert_eq!(vault.record(&a), LockRecord {
            amount: 40,
            release_time: later + 5 * DAY
        });
    }
}
