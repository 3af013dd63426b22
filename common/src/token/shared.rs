//! Async handle over a single token service
//!
//! Every call takes the same lock for its whole duration, so concurrent
//! tasks observe the calls one after the other, never interleaved.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::crypto::Address;
use crate::time::Clock;

use super::{Amount, BalanceInfo, Effects, LedgerResult, TokenService};

pub struct SharedTokenService<C: Clock> {
    inner: Arc<Mutex<TokenService<C>>>,
}

impl<C: Clock> Clone for SharedTokenService<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedTokenService<C> {
    pub fn new(service: TokenService<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Run a mutating call with exclusive access
    pub async fn write<T, F>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut TokenService<C>) -> LedgerResult<T>,
    {
        let mut service = self.inner.lock().await;
        f(&mut service)
    }

    /// Run a read against a consistent snapshot
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&TokenService<C>) -> T,
    {
        let service = self.inner.lock().await;
        f(&service)
    }

    pub async fn transfer(&self, caller: Address, to: Address, amount: Amount) -> LedgerResult<Effects> {
        self.write(|service| service.transfer(&caller, &to, amount)).await
    }

    pub async fn balance_info(&self, account: Address) -> BalanceInfo {
        self.read(|service| service.balance_info(&account)).await
    }
}
