//! # Mathematical Functions
//!
//! Pure arithmetic for the staking core: wide integers and the reward
//! apportionment rule.

pub mod big_int;
pub mod reward_math;

// Re-export commonly used items
pub use big_int::{Rounding, U256, U512};
pub use reward_math::{compute_reward_amount, RewardAmount};
