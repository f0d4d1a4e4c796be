//! # Operation Events
//!
//! Every state-changing operation appends one typed event to the staker's
//! log. Embedders drain the log with [`crate::Staker::take_events`] for
//! indexing or audit trails.

use serde::Serialize;

use crate::types::{Address, IncentiveId, PositionId, Timestamp};

/// Record of one completed ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StakerEvent {
    /// An incentive program was created or topped up
    IncentiveCreated {
        incentive_id: IncentiveId,
        pool: Address,
        reward_asset: Address,
        start_time: Timestamp,
        end_time: Timestamp,
        refundee: Address,
        amount: u128,
    },
    /// An incentive program ended and its remainder was refunded
    IncentiveEnded {
        incentive_id: IncentiveId,
        refund: u128,
    },
    /// A position entered custody
    DepositRecorded {
        position_id: PositionId,
        owner: Address,
    },
    /// Deposit ownership moved to a new account
    DepositTransferred {
        position_id: PositionId,
        old_owner: Address,
        new_owner: Address,
    },
    /// A position left custody
    DepositWithdrawn {
        position_id: PositionId,
        recipient: Address,
    },
    /// A position was staked into an incentive
    TokenStaked {
        incentive_id: IncentiveId,
        position_id: PositionId,
        liquidity: u128,
    },
    /// A stake was settled and its reward accrued
    TokenUnstaked {
        incentive_id: IncentiveId,
        position_id: PositionId,
        reward: u128,
    },
    /// Accrued rewards were paid out
    RewardClaimed {
        reward_asset: Address,
        owner: Address,
        to: Address,
        amount: u128,
    },
}
