//! Incentive program registry

use std::collections::HashMap;

use crate::errors::{StakerError, StakerResult};
use crate::types::{Incentive, IncentiveId};

/// Outcome of funding an incentive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundReceipt {
    /// Whether this call created the program (vs topping it up)
    pub created: bool,
    /// Unclaimed reward after the funding was applied
    pub total_reward_unclaimed: u128,
}

/// Registry of funded incentive programs, keyed by content hash
#[derive(Debug, Default)]
pub struct IncentiveRegistry {
    incentives: HashMap<IncentiveId, Incentive>,
}

impl IncentiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &IncentiveId) -> Option<&Incentive> {
        self.incentives.get(id)
    }

    pub fn get_mut(&mut self, id: &IncentiveId) -> Option<&mut Incentive> {
        self.incentives.get_mut(id)
    }

    /// Add `amount` to a program's unclaimed reward, creating the record if
    /// absent. Counters of an existing record are untouched: repeated
    /// creations top up the same program.
    pub fn fund(&mut self, id: IncentiveId, amount: u128) -> StakerResult<FundReceipt> {
        let created = !self.incentives.contains_key(&id);
        let incentive = self.incentives.entry(id).or_default();
        let total = incentive
            .total_reward_unclaimed
            .checked_add(amount)
            .ok_or(StakerError::MathOverflow)?;
        incentive.total_reward_unclaimed = total;
        Ok(FundReceipt {
            created,
            total_reward_unclaimed: total,
        })
    }

    /// Unwind a [`fund`](Self::fund) whose follow-up asset pull failed
    pub fn defund(&mut self, id: IncentiveId, amount: u128, created: bool) {
        if created {
            self.incentives.remove(&id);
        } else if let Some(incentive) = self.incentives.get_mut(&id) {
            incentive.total_reward_unclaimed =
                incentive.total_reward_unclaimed.saturating_sub(amount);
        }
    }

    /// Delete a program that has no outstanding stakes, returning its final
    /// state so the refund can be issued
    pub fn close(&mut self, id: &IncentiveId) -> StakerResult<Incentive> {
        let incentive = self
            .incentives
            .get(id)
            .ok_or(StakerError::UnknownIncentive)?;
        if incentive.number_of_stakes != 0 {
            return Err(StakerError::StakesOutstanding);
        }
        Ok(self
            .incentives
            .remove(id)
            .expect("checked above"))
    }

    /// Unwind a [`close`](Self::close) whose refund transfer failed
    pub fn restore(&mut self, id: IncentiveId, incentive: Incentive) {
        self.incentives.insert(id, incentive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> IncentiveId {
        IncentiveId([byte; 32])
    }

    #[test]
    fn test_fund_is_additive() {
        let mut registry = IncentiveRegistry::new();

        let first = registry.fund(id(1), 100).unwrap();
        assert!(first.created);
        assert_eq!(first.total_reward_unclaimed, 100);

        let second = registry.fund(id(1), 50).unwrap();
        assert!(!second.created);
        assert_eq!(second.total_reward_unclaimed, 150);
        assert_eq!(registry.get(&id(1)).unwrap().number_of_stakes, 0);
    }

    #[test]
    fn test_fund_overflow_is_checked() {
        let mut registry = IncentiveRegistry::new();
        registry.fund(id(1), u128::MAX).unwrap();
        assert_eq!(registry.fund(id(1), 1), Err(StakerError::MathOverflow));
    }

    #[test]
    fn test_defund_unwinds_creation() {
        let mut registry = IncentiveRegistry::new();
        let receipt = registry.fund(id(1), 100).unwrap();
        registry.defund(id(1), 100, receipt.created);
        assert!(registry.get(&id(1)).is_none());
    }

    #[test]
    fn test_close_requires_no_stakes() {
        let mut registry = IncentiveRegistry::new();
        registry.fund(id(1), 100).unwrap();
        registry.get_mut(&id(1)).unwrap().number_of_stakes = 1;

        assert_eq!(registry.close(&id(1)), Err(StakerError::StakesOutstanding));

        registry.get_mut(&id(1)).unwrap().number_of_stakes = 0;
        let closed = registry.close(&id(1)).unwrap();
        assert_eq!(closed.total_reward_unclaimed, 100);
        assert!(registry.get(&id(1)).is_none());
        assert_eq!(registry.close(&id(1)), Err(StakerError::UnknownIncentive));
    }
}
