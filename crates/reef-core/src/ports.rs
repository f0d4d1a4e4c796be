//! # Collaborator Ports
//!
//! The core reaches everything outside its own ledgers through these traits:
//! the external position registry, the pool's range oracle, and the asset
//! transfer rails. One environment value implements all three; tests and the
//! simulator provide in-memory implementations.

use crate::errors::StakerResult;
use crate::math::big_int::U256;
use crate::types::{Address, PositionId, PositionInfo, Timestamp};

/// Port to the external registry of liquidity positions
pub trait PositionPort {
    /// Current liquidity, price range, and pool of a position
    fn position(&self, position_id: PositionId) -> StakerResult<PositionInfo>;

    /// Atomically move custody of a position between accounts
    fn transfer_position(
        &mut self,
        position_id: PositionId,
        from: Address,
        to: Address,
    ) -> StakerResult<()>;
}

/// Port to the pool's seconds-per-liquidity-inside-range accumulator.
pub trait OraclePort {
    /// Running total of elapsed seconds normalized by in-range active
    /// liquidity, X128 fixed-point, for the given range as of `at`.
    ///
    /// Must be monotonically non-decreasing in `at` for a fixed range. The
    /// explicit timestamp lets an unstake past the program end sample the
    /// accumulator as of `end_time`.
    fn seconds_per_liquidity_inside(
        &self,
        pool: Address,
        tick_lower: i32,
        tick_upper: i32,
        at: Timestamp,
    ) -> StakerResult<U256>;
}

/// Port to the funding/reward asset rails, pull-from/push-to semantics.
/// A failure aborts the whole triggering operation.
pub trait AssetPort {
    /// Pull `amount` of `asset` from `from` into the ledger's custody
    fn pull(&mut self, asset: Address, from: Address, amount: u128) -> StakerResult<()>;

    /// Push `amount` of `asset` from the ledger's custody to `to`
    fn push(&mut self, asset: Address, to: Address, amount: u128) -> StakerResult<()>;
}

/// The full environment a [`crate::Staker`] operates against
pub trait StakingEnv: PositionPort + OraclePort + AssetPort {}

impl<T: PositionPort + OraclePort + AssetPort> StakingEnv for T {}
