//! # Staker - Public Operations
//!
//! Orchestrates the four ledgers against the collaborator ports. Every
//! operation is an atomic unit: inputs are validated and all arithmetic is
//! performed before the first ledger mutation, and external transfers are
//! issued only after the ledgers are final ("effects before interactions").
//! When a trailing transfer fails, the operation unwinds its ledger effects
//! and surfaces the error, so no partial state survives.

use crate::constants::{DEFAULT_MAX_INCENTIVE_DURATION, DEFAULT_MAX_INCENTIVE_START_LEAD_TIME};
use crate::errors::{StakerError, StakerResult};
use crate::events::StakerEvent;
use crate::ledger::{DepositLedger, IncentiveRegistry, RewardAccrual, StakeLedger};
use crate::math::reward_math::{compute_reward_amount, RewardAmount};
use crate::ports::StakingEnv;
use crate::types::{
    Address, Deposit, Incentive, IncentiveId, IncentiveKey, PositionId, Stake, Timestamp,
};

/// Deployment parameters of a staking ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakerConfig {
    /// Account that holds custody of deposited positions and pooled funds
    pub custody: Address,
    /// Upper bound on how far in the future an incentive may start
    pub max_incentive_start_lead_time: u64,
    /// Upper bound on incentive duration
    pub max_incentive_duration: u64,
}

impl StakerConfig {
    pub fn new(custody: Address) -> Self {
        StakerConfig {
            custody,
            max_incentive_start_lead_time: DEFAULT_MAX_INCENTIVE_START_LEAD_TIME,
            max_incentive_duration: DEFAULT_MAX_INCENTIVE_DURATION,
        }
    }
}

/// The staking core: incentive registry, position custody, stake records,
/// and reward accrual, wired to an environment implementing the ports.
#[derive(Debug)]
pub struct Staker<E: StakingEnv> {
    env: E,
    config: StakerConfig,
    incentives: IncentiveRegistry,
    deposits: DepositLedger,
    stakes: StakeLedger,
    rewards: RewardAccrual,
    events: Vec<StakerEvent>,
}

impl<E: StakingEnv> Staker<E> {
    pub fn new(env: E, config: StakerConfig) -> Self {
        Staker {
            env,
            config,
            incentives: IncentiveRegistry::new(),
            deposits: DepositLedger::new(),
            stakes: StakeLedger::new(),
            rewards: RewardAccrual::new(),
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Incentive lifecycle
    // ========================================================================

    /// Create an incentive program, or top up an existing one with the same
    /// key. Pulls `amount` of the reward asset from `caller`.
    pub fn create_incentive(
        &mut self,
        caller: Address,
        key: IncentiveKey,
        amount: u128,
        now: Timestamp,
    ) -> StakerResult<IncentiveId> {
        if amount == 0 {
            return Err(StakerError::ZeroRewardAmount);
        }
        if key.start_time < now {
            return Err(StakerError::StartTimeInPast);
        }
        if key.start_time - now > self.config.max_incentive_start_lead_time {
            return Err(StakerError::StartTimeTooFarAhead);
        }
        if key.end_time <= key.start_time {
            return Err(StakerError::InvalidTimeRange);
        }
        if key.end_time - key.start_time > self.config.max_incentive_duration {
            return Err(StakerError::DurationTooLong);
        }

        let incentive_id = key.incentive_id();
        let receipt = self.incentives.fund(incentive_id, amount)?;

        if let Err(err) = self.env.pull(key.reward_asset, caller, amount) {
            self.incentives.defund(incentive_id, amount, receipt.created);
            return Err(err);
        }

        self.emit(StakerEvent::IncentiveCreated {
            incentive_id,
            pool: key.pool,
            reward_asset: key.reward_asset,
            start_time: key.start_time,
            end_time: key.end_time,
            refundee: key.refundee,
            amount,
        });
        Ok(incentive_id)
    }

    /// End a program past its end time with no stakes outstanding, refunding
    /// the unclaimed remainder to the key's refundee. Callable by anyone.
    pub fn end_incentive(&mut self, key: IncentiveKey, now: Timestamp) -> StakerResult<u128> {
        if now <= key.end_time {
            return Err(StakerError::IncentiveNotEnded);
        }

        let incentive_id = key.incentive_id();
        let closed = self.incentives.close(&incentive_id)?;
        let refund = closed.total_reward_unclaimed;

        if refund > 0 {
            if let Err(err) = self.env.push(key.reward_asset, key.refundee, refund) {
                self.incentives.restore(incentive_id, closed);
                return Err(err);
            }
        }

        self.emit(StakerEvent::IncentiveEnded {
            incentive_id,
            refund,
        });
        Ok(refund)
    }

    // ========================================================================
    // Position custody
    // ========================================================================

    /// Take custody of an external position on behalf of `owner`
    pub fn deposit_position(&mut self, position_id: PositionId, owner: Address) -> StakerResult<()> {
        if owner.is_zero() {
            return Err(StakerError::InvalidRecipient);
        }

        self.deposits.record(position_id, owner)?;

        if let Err(err) = self
            .env
            .transfer_position(position_id, owner, self.config.custody)
        {
            self.deposits.discard(position_id);
            return Err(err);
        }

        self.emit(StakerEvent::DepositRecorded { position_id, owner });
        Ok(())
    }

    /// Return a fully unstaked position to `recipient`
    pub fn withdraw_position(
        &mut self,
        caller: Address,
        position_id: PositionId,
        recipient: Address,
    ) -> StakerResult<()> {
        if recipient.is_zero() || recipient == self.config.custody {
            return Err(StakerError::InvalidRecipient);
        }

        let deposit = self.deposits.remove_idle(position_id, caller)?;

        if let Err(err) = self
            .env
            .transfer_position(position_id, self.config.custody, recipient)
        {
            self.deposits.restore(position_id, deposit);
            return Err(err);
        }

        self.emit(StakerEvent::DepositWithdrawn {
            position_id,
            recipient,
        });
        Ok(())
    }

    /// Reassign a deposit to a new owner; stakes stay attached
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        position_id: PositionId,
        new_owner: Address,
    ) -> StakerResult<()> {
        let old_owner = self.deposits.transfer(position_id, caller, new_owner)?;
        self.emit(StakerEvent::DepositTransferred {
            position_id,
            old_owner,
            new_owner,
        });
        Ok(())
    }

    // ========================================================================
    // Staking
    // ========================================================================

    /// Stake a deposited position into a live incentive
    pub fn stake(
        &mut self,
        caller: Address,
        key: IncentiveKey,
        position_id: PositionId,
        now: Timestamp,
    ) -> StakerResult<()> {
        let incentive_id = key.incentive_id();
        let deposit = self.deposits.authorize(position_id, caller)?;

        let incentive = self
            .incentives
            .get(&incentive_id)
            .ok_or(StakerError::UnknownIncentive)?;
        if incentive.total_reward_unclaimed == 0 {
            return Err(StakerError::IncentiveDepleted);
        }
        if now < key.start_time {
            return Err(StakerError::IncentiveNotStarted);
        }
        if now >= key.end_time {
            return Err(StakerError::IncentiveEnded);
        }
        if self.stakes.get(position_id, incentive_id).is_some() {
            return Err(StakerError::StakeExists);
        }

        // both counter bumps are proven in range before any mutation
        deposit
            .number_of_stakes
            .checked_add(1)
            .ok_or(StakerError::MathOverflow)?;
        incentive
            .number_of_stakes
            .checked_add(1)
            .ok_or(StakerError::MathOverflow)?;

        let position = self.env.position(position_id)?;
        if position.pool != key.pool {
            return Err(StakerError::PoolMismatch);
        }
        if position.liquidity == 0 {
            return Err(StakerError::ZeroLiquidity);
        }

        let seconds_per_liquidity_inside_initial_x128 = self.env.seconds_per_liquidity_inside(
            key.pool,
            position.tick_lower,
            position.tick_upper,
            now,
        )?;

        self.stakes.record(
            position_id,
            incentive_id,
            Stake {
                liquidity: position.liquidity,
                seconds_per_liquidity_inside_initial_x128,
            },
        )?;
        self.deposits.increment_stakes(position_id)?;
        if let Some(incentive) = self.incentives.get_mut(&incentive_id) {
            incentive.number_of_stakes += 1;
        }

        self.emit(StakerEvent::TokenStaked {
            incentive_id,
            position_id,
            liquidity: position.liquidity,
        });
        Ok(())
    }

    /// Settle a stake: sample the oracle as of `min(now, end_time)`, credit
    /// the computed reward to the deposit owner's accrual, and release the
    /// stake. Before the program end only the owner may call; afterwards
    /// anyone may, so rewards cannot be stranded by an inactive owner.
    pub fn unstake(
        &mut self,
        caller: Address,
        key: IncentiveKey,
        position_id: PositionId,
        now: Timestamp,
    ) -> StakerResult<u128> {
        let incentive_id = key.incentive_id();
        let stake = *self.stakes.expect(position_id, incentive_id)?;
        let deposit = *self.deposits.expect(position_id)?;
        if now < key.end_time && deposit.owner != caller {
            return Err(StakerError::NotOwner);
        }
        let incentive = *self
            .incentives
            .get(&incentive_id)
            .ok_or(StakerError::UnknownIncentive)?;

        let position = self.env.position(position_id)?;
        let seconds_per_liquidity_inside_x128 = self.env.seconds_per_liquidity_inside(
            key.pool,
            position.tick_lower,
            position.tick_upper,
            now.min(key.end_time),
        )?;

        let RewardAmount {
            reward,
            seconds_inside_x128,
        } = compute_reward_amount(
            incentive.total_reward_unclaimed,
            incentive.total_seconds_claimed_x128,
            key.start_time,
            key.end_time,
            stake.liquidity,
            stake.seconds_per_liquidity_inside_initial_x128,
            seconds_per_liquidity_inside_x128,
            now,
        )?;

        // compute every new value before touching any ledger
        let new_unclaimed = incentive
            .total_reward_unclaimed
            .checked_sub(reward)
            .ok_or(StakerError::MathUnderflow)?;
        let new_claimed = incentive
            .total_seconds_claimed_x128
            .checked_add(&seconds_inside_x128)
            .ok_or(StakerError::MathOverflow)?;
        let new_incentive_stakes = incentive
            .number_of_stakes
            .checked_sub(1)
            .ok_or(StakerError::MathUnderflow)?;
        let new_accrued = self
            .rewards
            .balance(key.reward_asset, deposit.owner)
            .checked_add(reward)
            .ok_or(StakerError::MathOverflow)?;

        self.stakes.remove(position_id, incentive_id)?;
        self.deposits.decrement_stakes(position_id)?;
        if let Some(entry) = self.incentives.get_mut(&incentive_id) {
            entry.total_reward_unclaimed = new_unclaimed;
            entry.total_seconds_claimed_x128 = new_claimed;
            entry.number_of_stakes = new_incentive_stakes;
        }
        self.rewards
            .set_balance(key.reward_asset, deposit.owner, new_accrued);

        self.emit(StakerEvent::TokenUnstaked {
            incentive_id,
            position_id,
            reward,
        });
        Ok(reward)
    }

    /// Preview the reward an unstake would pay right now, without mutating
    /// anything
    pub fn get_reward_amount(
        &self,
        key: IncentiveKey,
        position_id: PositionId,
        now: Timestamp,
    ) -> StakerResult<RewardAmount> {
        let incentive_id = key.incentive_id();
        let stake = self.stakes.expect(position_id, incentive_id)?;
        let incentive = self
            .incentives
            .get(&incentive_id)
            .ok_or(StakerError::UnknownIncentive)?;

        let position = self.env.position(position_id)?;
        let seconds_per_liquidity_inside_x128 = self.env.seconds_per_liquidity_inside(
            key.pool,
            position.tick_lower,
            position.tick_upper,
            now.min(key.end_time),
        )?;

        compute_reward_amount(
            incentive.total_reward_unclaimed,
            incentive.total_seconds_claimed_x128,
            key.start_time,
            key.end_time,
            stake.liquidity,
            stake.seconds_per_liquidity_inside_initial_x128,
            seconds_per_liquidity_inside_x128,
            now,
        )
    }

    // ========================================================================
    // Reward claims
    // ========================================================================

    /// Pay out the caller's accrued rewards in `reward_asset` to `to`.
    /// `amount_requested` caps the payout; `None` claims the full balance.
    /// Returns the amount transferred.
    pub fn claim_reward(
        &mut self,
        caller: Address,
        reward_asset: Address,
        to: Address,
        amount_requested: Option<u128>,
    ) -> StakerResult<u128> {
        if to.is_zero() {
            return Err(StakerError::InvalidRecipient);
        }

        let balance = self.rewards.balance(reward_asset, caller);
        let amount = match amount_requested {
            Some(requested) => requested.min(balance),
            None => balance,
        };

        self.rewards
            .set_balance(reward_asset, caller, balance - amount);

        if amount > 0 {
            if let Err(err) = self.env.push(reward_asset, to, amount) {
                self.rewards.set_balance(reward_asset, caller, balance);
                return Err(err);
            }
        }

        self.emit(StakerEvent::RewardClaimed {
            reward_asset,
            owner: caller,
            to,
            amount,
        });
        Ok(amount)
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn config(&self) -> &StakerConfig {
        &self.config
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn incentive(&self, key: &IncentiveKey) -> Option<&Incentive> {
        self.incentives.get(&key.incentive_id())
    }

    pub fn incentive_by_id(&self, incentive_id: &IncentiveId) -> Option<&Incentive> {
        self.incentives.get(incentive_id)
    }

    pub fn deposit(&self, position_id: PositionId) -> Option<&Deposit> {
        self.deposits.get(position_id)
    }

    pub fn get_stake(&self, key: &IncentiveKey, position_id: PositionId) -> Option<&Stake> {
        self.stakes.get(position_id, key.incentive_id())
    }

    /// Rewards accrued and not yet claimed for (asset, owner)
    pub fn accrued_rewards(&self, reward_asset: Address, owner: Address) -> u128 {
        self.rewards.balance(reward_asset, owner)
    }

    /// Total unclaimed accrual across all owners for one asset
    pub fn total_accrued_for_asset(&self, reward_asset: Address) -> u128 {
        self.rewards.total_for_asset(reward_asset)
    }

    /// Drain the operation event log
    pub fn take_events(&mut self) -> Vec<StakerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Operation events emitted since the last drain
    pub fn events(&self) -> &[StakerEvent] {
        &self.events
    }

    fn emit(&mut self, event: StakerEvent) {
        self.events.push(event);
    }
}
