//! In-memory pool and token environment backing a scenario run
//!
//! Accounts, tokens, and pools are all named; an address is the SHA-256 of
//! the name, so scenarios stay readable while the ledger sees opaque 32-byte
//! identifiers. The range oracle integrates seconds-per-liquidity over the
//! pool's piecewise-constant active liquidity, with price modeled as always
//! inside every queried range.

use std::collections::HashMap;

use reef_core::{
    Address, AssetPort, OraclePort, PositionId, PositionInfo, PositionPort, StakerError,
    StakerResult, Timestamp, U256,
};
use sha2::{Digest, Sha256};

/// Stable address for a named account, token, or pool
pub fn address_of(name: &str) -> Address {
    let digest = Sha256::digest(name.as_bytes());
    Address::new(digest.into())
}

#[derive(Debug, Clone)]
struct SimPosition {
    info: PositionInfo,
    holder: Address,
}

/// Piecewise-constant active liquidity per pool
#[derive(Debug, Default, Clone)]
struct SimPool {
    /// (effective-from timestamp, active liquidity), in time order
    changes: Vec<(Timestamp, u128)>,
}

impl SimPool {
    fn active_liquidity(&self) -> u128 {
        self.changes.last().map(|&(_, l)| l).unwrap_or(0)
    }

    fn add_liquidity(&mut self, at: Timestamp, delta: i128) -> StakerResult<()> {
        let current = self.active_liquidity() as i128;
        let next = current
            .checked_add(delta)
            .filter(|&l| l >= 0)
            .ok_or(StakerError::MathUnderflow)? as u128;
        if let Some(&(last_at, _)) = self.changes.last() {
            if at < last_at {
                return Err(StakerError::OracleQueryFailed(
                    "liquidity change out of order".into(),
                ));
            }
        }
        self.changes.push((at, next));
        Ok(())
    }

    /// Seconds-per-liquidity accumulator as of `at`, X128
    fn acc_x128(&self, at: Timestamp) -> StakerResult<U256> {
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
                    .and_then(|shifted| shifted.checked_div(&U256::from_u128(liquidity)))
                    .ok_or(StakerError::MathOverflow)?;
                acc = acc
                    .checked_add(&slice)
                    .ok_or(StakerError::MathOverflow)?;
            }
        }
        Ok(acc)
    }
}

/// The environment a scenario's staker runs against
#[derive(Debug)]
pub struct SimEnv {
    /// The staker's custody account for pulled funds
    custody: Address,
    balances: HashMap<(Address, Address), u128>,
    positions: HashMap<PositionId, SimPosition>,
    pools: HashMap<Address, SimPool>,
    /// Reverse lookup for logging
    labels: HashMap<Address, String>,
}

impl SimEnv {
    pub fn new(custody: Address) -> Self {
        SimEnv {
            custody,
            balances: HashMap::new(),
            positions: HashMap::new(),
            pools: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    /// Register a name so log lines can render addresses readably
    pub fn register(&mut self, name: &str) -> Address {
        let address = address_of(name);
        self.labels.insert(address, name.to_string());
        address
    }

    pub fn label(&self, address: Address) -> String {
        self.labels
            .get(&address)
            .cloned()
            .unwrap_or_else(|| format!("{:?}", address))
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

    pub fn mint_position(
        &mut self,
        position_id: PositionId,
        holder: Address,
        pool: Address,
        liquidity: u128,
        at: Timestamp,
    ) -> StakerResult<()> {
        if self.positions.contains_key(&position_id) {
            return Err(StakerError::PositionLookupFailed(format!(
                "position {position_id} already exists"
            )));
        }
        self.positions.insert(
            position_id,
            SimPosition {
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
            .ok_or_else(|| StakerError::OracleQueryFailed("unknown pool".into()))?
            .add_liquidity(at, liquidity as i128)
    }

    /// Remove a position's liquidity from its pool and drop the position
    pub fn burn_position(&mut self, position_id: PositionId, at: Timestamp) -> StakerResult<()> {
        let position = self
            .positions
            .remove(&position_id)
            .ok_or_else(|| StakerError::PositionLookupFailed(format!("unknown id {position_id}")))?;
        self.pools
            .get_mut(&position.info.pool)
            .ok_or_else(|| StakerError::OracleQueryFailed("unknown pool".into()))?
            .add_liquidity(at, -(position.info.liquidity as i128))
    }

    pub fn position_holder(&self, position_id: PositionId) -> Option<Address> {
        self.positions.get(&position_id).map(|p| p.holder)
    }
}

impl PositionPort for SimEnv {
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
            return Err(StakerError::PositionTransferFailed(
                "not held by sender".into(),
            ));
        }
        position.holder = to;
        Ok(())
    }
}

impl OraclePort for SimEnv {
    fn seconds_per_liquidity_inside(
        &self,
        pool: Address,
        _tick_lower: i32,
        _tick_upper: i32,
        at: Timestamp,
    ) -> StakerResult<U256> {
        self.pools
            .get(&pool)
            .ok_or_else(|| StakerError::OracleQueryFailed("unknown pool".into()))?
            .acc_x128(at)
    }
}

impl AssetPort for SimEnv {
    fn pull(&mut self, asset: Address, from: Address, amount: u128) -> StakerResult<()> {
        let balance = self.balance_of(asset, from);
        if balance < amount {
            return Err(StakerError::AssetTransferFailed(format!(
                "{} holds {} of {}, needs {}",
                self.label(from),
                balance,
                self.label(asset),
                amount
            )));
        }
        self.balances.insert((asset, from), balance - amount);
        *self.balances.entry((asset, self.custody)).or_insert(0) += amount;
        Ok(())
    }

    fn push(&mut self, asset: Address, to: Address, amount: u128) -> StakerResult<()> {
        let custody = self.custody;
        let balance = self.balance_of(asset, custody);
        if balance < amount {
            return Err(StakerError::AssetTransferFailed(
                "insufficient custody balance".into(),
            ));
        }
        self.balances.insert((asset, custody), balance - amount);
        *self.balances.entry((asset, to)).or_insert(0) += amount;
        Ok(())
    }
}
