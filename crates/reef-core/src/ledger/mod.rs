//! # Ledger State
//!
//! Record-keeping for the four entity families the core persists: incentive
//! programs, position custody, live stakes, and accrued rewards. Each ledger
//! owns its map and enforces its record-level invariants; cross-ledger
//! orchestration lives in [`crate::staker`].

pub mod deposits;
pub mod incentives;
pub mod rewards;
pub mod stakes;

pub use deposits::DepositLedger;
pub use incentives::IncentiveRegistry;
pub use rewards::RewardAccrual;
pub use stakes::StakeLedger;
