//! Custody records for deposited positions

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Custody record for one externally-owned position held by the ledger.
/// `number_of_stakes` always equals the count of live stake records that
/// reference the position; withdrawal is rejected while it is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Account allowed to stake, unstake, transfer, and withdraw the position
    pub owner: Address,
    /// Live stakes currently attached to the position
    pub number_of_stakes: u32,
}

impl Deposit {
    pub fn new(owner: Address) -> Self {
        Deposit {
            owner,
            number_of_stakes: 0,
        }
    }
}
