//! Live stake records

use std::collections::HashMap;

use crate::errors::{StakerError, StakerResult};
use crate::types::{IncentiveId, PositionId, Stake};

/// Stake records keyed by (position, incentive). At most one live record per
/// pair.
#[derive(Debug, Default)]
pub struct StakeLedger {
    stakes: HashMap<(PositionId, IncentiveId), Stake>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position_id: PositionId, incentive_id: IncentiveId) -> Option<&Stake> {
        self.stakes.get(&(position_id, incentive_id))
    }

    /// The stake, or an error if the pair is not staked
    pub fn expect(
        &self,
        position_id: PositionId,
        incentive_id: IncentiveId,
    ) -> StakerResult<&Stake> {
        self.stakes
            .get(&(position_id, incentive_id))
            .ok_or(StakerError::UnknownStake)
    }

    pub fn record(
        &mut self,
        position_id: PositionId,
        incentive_id: IncentiveId,
        stake: Stake,
    ) -> StakerResult<()> {
        if self.stakes.contains_key(&(position_id, incentive_id)) {
            return Err(StakerError::StakeExists);
        }
        self.stakes.insert((position_id, incentive_id), stake);
        Ok(())
    }

    pub fn remove(
        &mut self,
        position_id: PositionId,
        incentive_id: IncentiveId,
    ) -> StakerResult<Stake> {
        self.stakes
            .remove(&(position_id, incentive_id))
            .ok_or(StakerError::UnknownStake)
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }
}
