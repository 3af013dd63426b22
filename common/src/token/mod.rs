//! Token Module
//!
//! Compliance-gated fungible token ledger, run as a deterministic state
//! machine invoked one call at a time.
//!
//! # Features
//!
//! - ERC20-like balances, transfers and allowances
//! - Mutable supply cap
//! - Address blacklist enforced on every balance-moving call
//! - Per-account time locks with lazy expiry
//! - Independent pause switches for transfers and minting
//! - NDA hash compliance check

pub mod access;
pub mod compliance;
pub mod error;
pub mod event;
pub mod ledger;
pub mod service;
pub mod types;
pub mod vault;

#[cfg(feature = "tokio")]
pub mod shared;


pub use access::*;
pub use compliance::*;
pub use error::*;
pub use event::*;
pub use ledger::*;
pub use service::*;
pub use types::*;
pub use vault::*;

#[cfg(feature = "tokio")]
pub use shared::*;
