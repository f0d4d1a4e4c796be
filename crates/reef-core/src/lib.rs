//! # Reef Core - Liquidity Incentive Staking Engine
//!
//! This crate contains the ledgers and reward mathematics that let holders of
//! externally-owned concentrated-liquidity positions earn rewards from
//! time-boxed incentive programs. It provides:
//!
//! - The incentive lifecycle (additive funding, refund-on-end)
//! - Custody bookkeeping for deposited positions
//! - Per (position, incentive) stake records
//! - The incremental reward-apportionment math that conserves funded rewards
//!   across any sequence of stake/unstake operations in O(1) state per call
//! - Pull-based reward accrual, decoupled from the stake lifecycle
//!
//! The engine is pure and synchronous: pools, positions, and asset transfers
//! are reached through the port traits in [`ports`], and every public
//! operation takes the current time as an explicit argument.

pub mod constants;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod math;
pub mod ports;
pub mod staker;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{StakerError, StakerResult};
pub use events::StakerEvent;
pub use math::{big_int::U256, reward_math::RewardAmount};
pub use ports::{AssetPort, OraclePort, PositionPort, StakingEnv};
pub use staker::{Staker, StakerConfig};
pub use types::*;
