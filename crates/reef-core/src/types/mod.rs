//! # Core Types
//!
//! Entity definitions for the staking ledgers, plus the scalar aliases shared
//! across the crate.

pub mod deposit;
pub mod incentive;
pub mod stake;

pub mod address;

pub use address::{Address, ParseAddressError};
pub use deposit::Deposit;
pub use incentive::{Incentive, IncentiveId, IncentiveKey};
pub use stake::Stake;

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Identifier of an externally-owned liquidity position
pub type PositionId = u64;

/// Snapshot of an external position, as reported by the position source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    /// Pool the position provides liquidity to
    pub pool: Address,
    /// Lower bound of the position's price range
    pub tick_lower: i32,
    /// Upper bound of the position's price range
    pub tick_upper: i32,
    /// Current liquidity magnitude of the position
    pub liquidity: u128,
}
