//! # Reward Apportionment Math
//!
//! The core allocation rule for incentive rewards. Each unstake takes a share
//! of the *currently remaining* reward pool proportional to the stake's share
//! of the *currently remaining* eligible liquidity-seconds, then the caller
//! subtracts exactly what was consumed from both. Summed over the life of an
//! incentive, with every stake eventually unwound, the payouts converge to
//! the funded amount to within floor-division rounding, with no iteration
//! over participants and O(1) state per call.

use crate::constants::X128_SHIFT;
use crate::errors::{StakerError, StakerResult};
use crate::math::big_int::{Rounding, U256};
use crate::types::Timestamp;

/// Result of one reward computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardAmount {
    /// Reward owed to the stake, in reward-asset units
    pub reward: u128,
    /// Liquidity-seconds consumed by the stake, X128 fixed-point
    pub seconds_inside_x128: U256,
}

/// Compute the reward owed to a single stake over one interval.
///
/// `seconds_per_liquidity_inside_x128` must be sampled at
/// `min(current_time, end_time)` by the caller, so that time past the end of
/// the program never accrues. The caller is expected to apply the result as
/// `total_reward_unclaimed -= reward` and
/// `total_seconds_claimed_x128 += seconds_inside_x128`.
#[allow(clippy::too_many_arguments)]
pub fn compute_reward_amount(
    total_reward_unclaimed: u128,
    total_seconds_claimed_x128: U256,
    start_time: Timestamp,
    end_time: Timestamp,
    liquidity: u128,
    seconds_per_liquidity_inside_initial_x128: U256,
    seconds_per_liquidity_inside_x128: U256,
    current_time: Timestamp,
) -> StakerResult<RewardAmount> {
    // a stake can only exist after the incentive has started
    if current_time < start_time {
        return Err(StakerError::IncentiveNotStarted);
    }

    let delta_x128 = seconds_per_liquidity_inside_x128
        .checked_sub(&seconds_per_liquidity_inside_initial_x128)
        .ok_or(StakerError::OracleRegression)?;

    let seconds_inside_x128 = delta_x128
        .checked_mul(&U256::from_u128(liquidity))
        .ok_or(StakerError::MathOverflow)?;

    let elapsed = end_time
        .max(current_time)
        .checked_sub(start_time)
        .ok_or(StakerError::MathUnderflow)?;

    let total_seconds_unclaimed_x128 = U256::from_u64(elapsed)
        .checked_shl(X128_SHIFT)
        .ok_or(StakerError::MathOverflow)?
        .checked_sub(&total_seconds_claimed_x128)
        .ok_or(StakerError::MathUnderflow)?;

    // degenerate: everything already attributed
    if total_seconds_unclaimed_x128.is_zero() {
        return Ok(RewardAmount {
            reward: 0,
            seconds_inside_x128,
        });
    }

    let reward = U256::from_u128(total_reward_unclaimed)
        .mul_div(
            &seconds_inside_x128,
            &total_seconds_unclaimed_x128,
            Rounding::Down,
        )
        .ok_or(StakerError::MulDivOverflow)?
        .to_u128()
        .ok_or(StakerError::MathOverflow)?;

    Ok(RewardAmount {
        reward,
        seconds_inside_x128,
    })
}
