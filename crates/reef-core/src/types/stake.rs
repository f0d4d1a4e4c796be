//! Stake records linking positions to incentives

use serde::{Deserialize, Serialize};

use crate::math::big_int::U256;

/// Snapshot taken when a position is staked into an incentive. At most one
/// live record exists per (position, incentive) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    /// Position liquidity at stake time
    pub liquidity: u128,
    /// Range-oracle reading at stake time, X128
    pub seconds_per_liquidity_inside_initial_x128: U256,
}
