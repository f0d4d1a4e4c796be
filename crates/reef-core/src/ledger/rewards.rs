//! Accrued reward balances

use std::collections::HashMap;

use crate::types::Address;

/// Claimable reward balances per (reward asset, owner). Credited on unstake,
/// debited on claim; fully decoupled from the stake lifecycle.
#[derive(Debug, Default)]
pub struct RewardAccrual {
    accrued: HashMap<(Address, Address), u128>,
}

impl RewardAccrual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, asset: Address, owner: Address) -> u128 {
        self.accrued.get(&(asset, owner)).copied().unwrap_or(0)
    }

    /// Overwrite a balance; zero balances drop the entry
    pub fn set_balance(&mut self, asset: Address, owner: Address, amount: u128) {
        if amount == 0 {
            self.accrued.remove(&(asset, owner));
        } else {
            self.accrued.insert((asset, owner), amount);
        }
    }

    /// Total accrued across all owners for one asset, for audits
    pub fn total_for_asset(&self, asset: Address) -> u128 {
        self.accrued
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, amount)| amount)
            .sum()
    }
}
