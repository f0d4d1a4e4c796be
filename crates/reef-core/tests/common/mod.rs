#![allow(dead_code)] // not every test binary uses every helper

//! Shared in-memory environment for integration tests
//!
//! Implements the three collaborator ports over plain maps: a token ledger
//! with pull/push semantics, a position registry, and a per-pool
//! seconds-per-liquidity accumulator integrated over piecewise-constant
//! active liquidity. Price is modeled as always inside every queried range,
//! which is the regime the reward math is exercised in.

use std::collections::HashMap;

use reef_core::{
    Address, AssetPort, OraclePort, PositionId, PositionInfo, PositionPort, Staker, StakerConfig,
    StakerError, StakerResult, Timestamp, U256,
};

pub const CUSTODY: Address = Address::new([0xcc; 32]);

pub fn addr(byte: u8) -> Address {
    Address::new([byte; 32])
}

#[derive(Debug, Clone)]
struct TestPosition {
    info: PositionInfo,
    holder: Address,
}

/// Piecewise-constant active liquidity with a lazily integrated accumulator
#[derive(Debug, Default, Clone)]
struct PoolSim {
    /// (effective-from timestamp, active liquidity), appended in time order
    changes: Vec<(Timestamp, u128)>,
}

impl PoolSim {
    fn active_liquidity(&self) -> u128 {
        self.changes.last().map(|&(_, l)| l).unwrap_or(0)
    }

    fn add_liquidity(&mut self, at: Timestamp, delta: i128) {
        let current = self.active_liquidity() as i128;
        let next = (current + delta) as u128;
        self.changes.push((at, next));
    }

    /// Seconds-per-liquidity accumulator as of `at`, X128
    fn acc_x128(&self, at: Timestamp) -> U256 {
        let mut acc = U256::ZERO;
        for (i, &(from, liquidity)) in self.changes.iter().enumerate() {
            if from >= at {
                break;
            }
            let until = match self.changes.get(i + 1) {
                Some(&(next_from, _)) => next_from.min(at),
                None => at,
            };
            if until > from && liquidity > 0 {
                let slice = U256::from_u64(until - from)
                    .checked_shl(128)
                    .unwrap()
                    .checked_div(&U256::from_u128(liquidity))
                    .unwrap();
                acc = acc.checked_add(&slice).unwrap();
            }
        }
        acc
    }
}

#[derive(Debug, Default)]
pub struct TestEnv {
    balances: HashMap<(Address, Address), u128>,
    positions: HashMap<PositionId, TestPosition>,
    pools: HashMap<Address, PoolSim>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, asset: Address, to: Address, amount: u128) {
        *self.balances.entry((asset, to)).or_insert(0) += amount;
    }

    pub fn balance_of(&self, asset: Address, holder: Address) -> u128 {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    pub fn create_pool(&mut self, pool: Address) {
        self.pools.entry(pool).or_default();
    }

    /// Mint a position and add its liquidity to the pool's active set
    pub fn mint_position(
        &mut self,
        position_id: PositionId,
        holder: Address,
        pool: Address,
        liquidity: u128,
        at: Timestamp,
    ) {
        self.create_pool(pool);
        self.positions.insert(
            position_id,
            TestPosition {
                info: PositionInfo {
                    pool,
                    tick_lower: -887_272,
                    tick_upper: 887_272,
                    liquidity,
                },
                holder,
            },
        );
        self.pools
            .get_mut(&pool)
            .unwrap()
            .add_liquidity(at, liquidity as i128);
    }

    /// Burn a position, removing its liquidity from the pool's active set
    pub fn burn_position(&mut self, position_id: PositionId, at: Timestamp) {
        let position = self.positions.remove(&position_id).unwrap();
        self.pools
            .get_mut(&position.info.pool)
            .unwrap()
            .add_liquidity(at, -(position.info.liquidity as i128));
    }

    pub fn position_holder(&self, position_id: PositionId) -> Option<Address> {
        self.positions.get(&position_id).map(|p| p.holder)
    }
}

impl PositionPort for TestEnv {
    fn position(&self, position_id: PositionId) -> StakerResult<PositionInfo> {
        self.positions
            .get(&position_id)
            .map(|p| p.info)
            .ok_or_else(|| StakerError::PositionLookupFailed(format!("unknown id {position_id}")))
    }

    fn transfer_position(
        &mut self,
        position_id: PositionId,
        from: Address,
        to: Address,
    ) -> StakerResult<()> {
        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or_else(|| StakerError::PositionTransferFailed("unknown position".into()))?;
        if position.holder != from {
            return Err(StakerError::PositionTransferFailed("not held by sender".into()));
        }
        position.holder = to;
        Ok(())
    }
}

impl OraclePort for TestEnv {
    fn seconds_per_liquidity_inside(
        &self,
        pool: Address,
        _tick_lower: i32,
        _tick_upper: i32,
        at: Timestamp,
    ) -> StakerResult<U256> {
        let pool = self
            .pools
            .get(&pool)
            .ok_or_else(|| StakerError::OracleQueryFailed("unknown pool".into()))?;
        Ok(pool.acc_x128(at))
    }
}

impl AssetPort for TestEnv {
    fn pull(&mut self, asset: Address, from: Address, amount: u128) -> StakerResult<()> {
        let balance = self.balance_of(asset, from);
        if balance < amount {
            return Err(StakerError::AssetTransferFailed("insufficient balance".into()));
        }
        self.balances.insert((asset, from), balance - amount);
        *self.balances.entry((asset, CUSTODY)).or_insert(0) += amount;
        Ok(())
    }

    fn push(&mut self, asset: Address, to: Address, amount: u128) -> StakerResult<()> {
        let balance = self.balance_of(asset, CUSTODY);
        if balance < amount {
            return Err(StakerError::AssetTransferFailed("insufficient custody balance".into()));
        }
        self.balances.insert((asset, CUSTODY), balance - amount);
        *self.balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }
}

/// A staker over a fresh environment with the default bounds
pub fn new_staker() -> Staker<TestEnv> {
    Staker::new(TestEnv::new(), StakerConfig::new(CUSTODY))
}
