use crate::token::Amount;

pub const VERSION: &str = env!("BUILD_VERSION");

// ===== Token Metadata =====

/// Decimals are fixed for every ledger instance
pub const TOKEN_DECIMALS: u8 = 18;

/// Value of one whole token in base units (10^18)
pub const COIN_VALUE: Amount = 1_000_000_000_000_000_000;

/// Maximum length of token name (bytes)
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length of token symbol/ticker (bytes)
pub const MAX_SYMBOL_LENGTH: usize = 12;

// ===== Deployment Defaults =====

pub const DEFAULT_TOKEN_NAME: &str = "SalisToken";
pub const DEFAULT_TOKEN_SYMBOL: &str = "SATO";

/// 1 million tokens minted to the deployer
pub const DEFAULT_INITIAL_SUPPLY: Amount = 1_000_000 * COIN_VALUE;

/// 10 million tokens cap
pub const DEFAULT_MAX_SUPPLY: Amount = 10_000_000 * COIN_VALUE;

/// NDA document hashed when no hash is provided
pub const DEFAULT_NDA_CONTENT: &str = "Sample NDA content for deployment";

// ===== Compliance =====

/// Maximum addresses accepted by a single blacklist batch update
pub const MAX_BLACKLIST_BATCH: usize = 100;

// ===== Timelock =====

/// Lock durations are expressed in days
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

// ===== Allowances =====

/// Allowance that is never decremented by transferFrom
pub const UNLIMITED_ALLOWANCE: Amount = Amount::MAX;
