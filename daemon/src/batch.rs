// Batch replay
//
// A batch file is a JSON list of steps. Each step moves the replay clock
// forward, then submits one call on behalf of its caller. A rejected call is
// recorded with its error code and the replay goes on: every call is
// independent and a rejection leaves the ledger untouched.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use salis_common::{
    crypto::Address,
    time::{Clock, ManualClock, TimestampSeconds},
    token::{
        Amount, BalanceInfo, Effects, LedgerError, LedgerResult, SharedTokenService, TokenInfo,
        TokenService,
    },
};

/// One ledger call, externally tagged by its snake_case name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Mint {
        to: Address,
        amount: Amount,
    },
    Burn {
        amount: Amount,
    },
    BurnFrom {
        account: Address,
        amount: Amount,
    },
    Transfer {
        to: Address,
        amount: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approve {
        spender: Address,
        amount: Amount,
    },
    DistributeLocked {
        to: Address,
        amount: Amount,
        lock_days: u64,
    },
    UnlockExpired {
        account: Address,
    },
    SetBlacklist {
        account: Address,
        flag: bool,
    },
    SetBlacklistBatch {
        accounts: Vec<Address>,
        flag: bool,
    },
    Pause,
    Unpause,
    PauseMinting,
    ResumeMinting,
    SetMaxSupply {
        max_supply: Amount,
    },
    TransferOwnership {
        new_owner: Address,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::BurnFrom { .. } => "burn_from",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Approve { .. } => "approve",
            Self::DistributeLocked { .. } => "distribute_locked",
            Self::UnlockExpired { .. } => "unlock_expired",
            Self::SetBlacklist { .. } => "set_blacklist",
            Self::SetBlacklistBatch { .. } => "set_blacklist_batch",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::PauseMinting => "pause_minting",
            Self::ResumeMinting => "resume_minting",
            Self::SetMaxSupply { .. } => "set_max_supply",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }

    /// Submit the call to `service` on behalf of `caller`
    pub fn apply<C: Clock>(&self, service: &mut TokenService<C>, caller: &Address) -> LedgerResult<Effects> {
        match self {
            Self::Mint { to, amount } => service.mint(caller, to, *amount),
            Self::Burn { amount } => service.burn(caller, *amount),
            Self::BurnFrom { account, amount } => service.burn_from(caller, account, *amount),
            Self::Transfer { to, amount } => service.transfer(caller, to, *amount),
            Self::TransferFrom { from, to, amount } => service.transfer_from(caller, from, to, *amount),
            Self::Approve { spender, amount } => service.approve(caller, spender, *amount),
            Self::DistributeLocked {
                to,
                amount,
                lock_days,
            } => service.distribute_locked(caller, to, *amount, *lock_days),
            Self::UnlockExpired { account } => service.unlock_expired(caller, account),
            Self::SetBlacklist { account, flag } => service.set_blacklist(caller, account, *flag),
            Self::SetBlacklistBatch { accounts, flag } => {
                service.set_blacklist_batch(caller, accounts, *flag)
            }
            Self::Pause => service.pause(caller),
            Self::Unpause => service.unpause(caller),
            Self::PauseMinting => service.pause_minting(caller),
            Self::ResumeMinting => service.resume_minting(caller),
            Self::SetMaxSupply { max_supply } => service.set_max_supply(caller, *max_supply),
            Self::TransferOwnership { new_owner } => service.transfer_ownership(caller, new_owner),
        }
    }

    /// Accounts the call refers to, the caller excluded
    pub fn accounts(&self) -> Vec<Address> {
        match self {
            Self::Mint { to, .. }
            | Self::Transfer { to, .. }
            | Self::DistributeLocked { to, .. } => vec![*to],
            Self::BurnFrom { account, .. }
            | Self::UnlockExpired { account }
            | Self::SetBlacklist { account, .. } => vec![*account],
            Self::TransferFrom { from, to, .. } => vec![*from, *to],
            Self::Approve { spender, .. } => vec![*spender],
            Self::SetBlacklistBatch { accounts, .. } => accounts.clone(),
            Self::TransferOwnership { new_owner } => vec![*new_owner],
            Self::Burn { .. }
            | Self::Pause
            | Self::Unpause
            | Self::PauseMinting
            | Self::ResumeMinting
            | Self::SetMaxSupply { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub caller: Address,
    /// Seconds to move the replay clock forward before the call
    #[serde(default)]
    pub advance_secs: u64,
    pub call: Call,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub code: u64,
    pub kind: &'static str,
    pub message: String,
}

impl From<&LedgerError> for StepError {
    fn from(err: &LedgerError) -> Self {
        Self {
            code: err.to_code(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub timestamp: TimestampSeconds,
    pub caller: Address,
    pub call: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Effects>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    pub address: Address,
    pub blacklisted: bool,
    #[serde(flatten)]
    pub info: BalanceInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub token: TokenInfo,
    pub owner: Address,
    pub paused: bool,
    pub minting_paused: bool,
    pub blacklist_count: usize,
    pub timestamp: TimestampSeconds,
    pub accepted: usize,
    pub rejected: usize,
    pub deployment: Effects,
    pub steps: Vec<StepReport>,
    pub accounts: Vec<AccountReport>,
}

/// Replay `steps` in order against `service`
///
/// `clock` must be the clock `service` reads.
pub async fn run_steps(
    service: &SharedTokenService<ManualClock>,
    clock: &ManualClock,
    steps: &[Step],
) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        if step.advance_secs > 0 {
            clock.advance(step.advance_secs);
        }

        let result = service
            .write(|token| step.call.apply(token, &step.caller))
            .await;
        // Time as the ledger saw it, the replay clock may lag behind
        let timestamp = service.read(|token| token.now()).await;

        let report = match result {
            Ok(events) => {
                if log::log_enabled!(log::Level::Debug) {
                    debug!(
                        "step #{} {} by {}: {} event(s)",
                        index,
                        step.call.name(),
                        step.caller,
                        events.len()
                    );
                }
                StepReport {
                    index,
                    timestamp,
                    caller: step.caller,
                    call: step.call.name(),
                    events: Some(events),
                    error: None,
                }
            }
            Err(e) => {
                if log::log_enabled!(log::Level::Warn) {
                    warn!("step #{} {} by {} rejected: {}", index, step.call.name(), step.caller, e);
                }
                StepReport {
                    index,
                    timestamp,
                    caller: step.caller,
                    call: step.call.name(),
                    events: None,
                    error: Some(StepError::from(&e)),
                }
            }
        };
        reports.push(report);
    }

    let accepted = reports.iter().filter(|r| r.is_ok()).count();
    info!("replayed {} step(s): {} accepted, {} rejected", reports.len(), accepted, reports.len() - accepted);
    reports
}

/// Build the final report over every account seen during the replay
pub async fn build_report(
    service: &SharedTokenService<ManualClock>,
    deployment: Effects,
    steps: &[Step],
    reports: Vec<StepReport>,
) -> BatchReport {
    service
        .read(|token| {
            let mut seen = BTreeSet::new();
            seen.insert(*token.owner());
            seen.extend(token.holders());
            for step in steps {
                seen.insert(step.caller);
                seen.extend(step.call.accounts());
            }
            seen.remove(&Address::zero());

            let accounts = seen
                .into_iter()
                .map(|address| AccountReport {
                    address,
                    blacklisted: token.is_blacklisted(&address),
                    info: token.balance_info(&address),
                })
                .collect();

            let accepted = reports.iter().filter(|r| r.is_ok()).count();
            BatchReport {
                token: token.token_info(),
                owner: *token.owner(),
                paused: token.is_paused(),
                minting_paused: token.is_minting_paused(),
                blacklist_count: token.blacklist_count(),
                timestamp: token.now(),
                accepted,
                rejected: reports.len() - accepted,
                deployment,
                steps: reports,
                accounts,
            }
        })
        .await
}
