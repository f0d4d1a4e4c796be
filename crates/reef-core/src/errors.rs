//! # Core Error Types
//!
//! Every public operation fails atomically with one of these errors; there is
//! no partial commit and no retry at this layer.

use thiserror::Error;

/// Errors surfaced by the staking core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakerError {
    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Reward amount must be positive")]
    ZeroRewardAmount,

    #[error("Start time must be now or in the future")]
    StartTimeInPast,

    #[error("Start time too far into the future")]
    StartTimeTooFarAhead,

    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Incentive duration is too long")]
    DurationTooLong,

    #[error("Non-existent incentive")]
    UnknownIncentive,

    #[error("Cannot end incentive before end time")]
    IncentiveNotEnded,

    #[error("Cannot end incentive while stakes remain")]
    StakesOutstanding,

    #[error("Incentive has no remaining reward")]
    IncentiveDepleted,

    #[error("Incentive has not started yet")]
    IncentiveNotStarted,

    #[error("Incentive has ended")]
    IncentiveEnded,

    #[error("Position is already deposited")]
    DepositExists,

    #[error("Position is not deposited")]
    UnknownDeposit,

    #[error("Cannot withdraw position while stakes remain")]
    DepositStillStaked,

    #[error("Caller is not the position owner")]
    NotOwner,

    #[error("Invalid recipient")]
    InvalidRecipient,

    #[error("Position is already staked in this incentive")]
    StakeExists,

    #[error("Stake does not exist")]
    UnknownStake,

    #[error("Cannot stake a position with zero liquidity")]
    ZeroLiquidity,

    #[error("Position pool does not match the incentive pool")]
    PoolMismatch,

    #[error("Range oracle value regressed below the stake snapshot")]
    OracleRegression,

    // ========================================================================
    // Arithmetic Errors
    // ========================================================================

    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Mul div overflow")]
    MulDivOverflow,

    // ========================================================================
    // External-Call Errors
    // ========================================================================

    #[error("Position lookup failed: {0}")]
    PositionLookupFailed(String),

    #[error("Position transfer failed: {0}")]
    PositionTransferFailed(String),

    #[error("Asset transfer failed: {0}")]
    AssetTransferFailed(String),

    #[error("Oracle query failed: {0}")]
    OracleQueryFailed(String),
}

/// Result type using core errors
pub type StakerResult<T> = Result<T, StakerError>;
