//! Scenario execution and conservation audit

use std::collections::HashMap;

use log::{debug, info};
use reef_core::{Address, IncentiveKey, Staker, StakerConfig};

use crate::config::{Operation, ScenarioConfig};
use crate::env::{address_of, SimEnv};
use crate::error::{SimError, SimResult};

/// Accounting summary for one incentive after the timeline ran
#[derive(Debug, Clone)]
pub struct IncentiveAudit {
    pub name: String,
    pub funded: u128,
    /// Rewards credited across all unstakes
    pub paid: u128,
    /// Refund issued on end, if the program was ended
    pub refunded: Option<u128>,
    /// Unclaimed reward still held by a live program
    pub remaining: u128,
}

impl IncentiveAudit {
    /// Every funded unit must be paid out, refunded, or still ledgered
    pub fn conserved(&self) -> bool {
        self.funded == self.paid + self.refunded.unwrap_or(0) + self.remaining
    }
}

#[derive(Debug, Clone)]
pub struct AuditReport {
    pub incentives: Vec<IncentiveAudit>,
}

impl AuditReport {
    pub fn conserved(&self) -> bool {
        self.incentives.iter().all(IncentiveAudit::conserved)
    }
}

/// Drives one scenario through a staker over a [`SimEnv`]
pub struct ScenarioRunner {
    config: ScenarioConfig,
    staker: Staker<SimEnv>,
    keys: HashMap<String, IncentiveKey>,
    funded: HashMap<String, u128>,
    paid: HashMap<String, u128>,
    refunded: HashMap<String, u128>,
}

impl ScenarioRunner {
    /// Set up the environment and create every configured incentive at
    /// genesis
    pub fn new(config: ScenarioConfig) -> SimResult<Self> {
        let custody = address_of("staker:custody");
        let mut env = SimEnv::new(custody);
        env.register("staker:custody");

        for pool in &config.pools {
            let pool_address = env.register(&pool.name);
            env.create_pool(pool_address);
        }

        for position in &config.positions {
            let holder = env.register(&position.owner);
            let pool = address_of(&position.pool);
            env.mint_position(
                position.id,
                holder,
                pool,
                position.liquidity as u128,
                config.genesis,
            )?;
            debug!(
                "minted position {} for {} with liquidity {}",
                position.id, position.owner, position.liquidity
            );
        }

        for incentive in &config.incentives {
            let funder = env.register(&incentive.funder);
            env.register(&incentive.refundee);
            let token = env.register(&incentive.reward_token);
            env.mint(token, funder, incentive.amount as u128);
        }

        let mut staker = Staker::new(env, StakerConfig::new(custody));
        let mut keys = HashMap::new();
        let mut funded = HashMap::new();

        for incentive in &config.incentives {
            let start_time = config.genesis + incentive.start_offset;
            let key = IncentiveKey {
                pool: address_of(&incentive.pool),
                reward_asset: address_of(&incentive.reward_token),
                start_time,
                end_time: start_time + incentive.duration,
                refundee: address_of(&incentive.refundee),
            };
            let id = staker.create_incentive(
                address_of(&incentive.funder),
                key,
                incentive.amount as u128,
                config.genesis,
            )?;
            info!(
                "incentive '{}' created as {} ({} units over {}s)",
                incentive.name, id, incentive.amount, incentive.duration
            );
            keys.insert(incentive.name.clone(), key);
            *funded.entry(incentive.name.clone()).or_insert(0) += incentive.amount as u128;
        }

        Ok(ScenarioRunner {
            config,
            staker,
            keys,
            funded,
            paid: HashMap::new(),
            refunded: HashMap::new(),
        })
    }

    /// Execute the timeline in order, then audit every incentive
    pub fn run(mut self) -> SimResult<AuditReport> {
        let mut actions = self.config.actions.clone();
        actions.sort_by_key(|action| action.at);

        info!(
            "running scenario '{}' with {} actions",
            self.config.name,
            actions.len()
        );

        for action in &actions {
            let now = self.config.genesis + action.at;
            self.apply(&action.op, now)?;
            for event in self.staker.take_events() {
                debug!("event at +{}: {:?}", action.at, event);
            }
        }

        Ok(self.audit())
    }

    fn key_for(&self, incentive: &str) -> SimResult<IncentiveKey> {
        self.keys
            .get(incentive)
            .copied()
            .ok_or_else(|| SimError::Scenario(format!("unknown incentive '{incentive}'")))
    }

    fn deposit_owner(&self, position: u64) -> SimResult<Address> {
        self.staker
            .deposit(position)
            .map(|deposit| deposit.owner)
            .ok_or_else(|| SimError::Scenario(format!("position {position} is not deposited")))
    }

    fn apply(&mut self, op: &Operation, now: u64) -> SimResult<()> {
        match op {
            Operation::Deposit { position } => {
                let owner = self
                    .staker
                    .env()
                    .position_holder(*position)
                    .ok_or_else(|| {
                        SimError::Scenario(format!("unknown position {position}"))
                    })?;
                self.staker.deposit_position(*position, owner)?;
                info!("deposited position {} for {}", position, self.label(owner));
            }
            Operation::Stake {
                position,
                incentive,
            } => {
                let key = self.key_for(incentive)?;
                let owner = self.deposit_owner(*position)?;
                self.staker.stake(owner, key, *position, now)?;
                info!("staked position {} into '{}'", position, incentive);
            }
            Operation::Unstake {
                position,
                incentive,
                by,
            } => {
                let key = self.key_for(incentive)?;
                let caller = match by {
                    Some(name) => address_of(name),
                    None => self.deposit_owner(*position)?,
                };
                let reward = self.staker.unstake(caller, key, *position, now)?;
                *self.paid.entry(incentive.clone()).or_insert(0) += reward;
                info!(
                    "unstaked position {} from '{}' for a reward of {}",
                    position, incentive, reward
                );
            }
            Operation::Transfer { position, to } => {
                let owner = self.deposit_owner(*position)?;
                let new_owner = self.staker.env_mut().register(to);
                self.staker.transfer_ownership(owner, *position, new_owner)?;
                info!("transferred position {} to {}", position, to);
            }
            Operation::Withdraw {
                position,
                recipient,
                burn,
            } => {
                let owner = self.deposit_owner(*position)?;
                let recipient = match recipient {
                    Some(name) => self.staker.env_mut().register(name),
                    None => owner,
                };
                self.staker.withdraw_position(owner, *position, recipient)?;
                if *burn {
                    self.staker.env_mut().burn_position(*position, now)?;
                }
                info!(
                    "withdrew position {}{}",
                    position,
                    if *burn { " and burned it" } else { "" }
                );
            }
            Operation::Claim {
                actor,
                token,
                amount,
            } => {
                let actor_address = self.staker.env_mut().register(actor);
                let token_address = self.staker.env_mut().register(token);
                let paid = self.staker.claim_reward(
                    actor_address,
                    token_address,
                    actor_address,
                    amount.map(u128::from),
                )?;
                info!("{} claimed {} of {}", actor, paid, token);
            }
            Operation::End { incentive } => {
                let key = self.key_for(incentive)?;
                let refund = self.staker.end_incentive(key, now)?;
                *self.refunded.entry(incentive.clone()).or_insert(0) += refund;
                info!("ended '{}' with a refund of {}", incentive, refund);
            }
        }
        Ok(())
    }

    fn label(&self, address: Address) -> String {
        self.staker.env().label(address)
    }

    fn audit(&self) -> AuditReport {
        let mut incentives = Vec::new();
        for (name, &funded) in &self.funded {
            let key = &self.keys[name];
            let remaining = self
                .staker
                .incentive(key)
                .map(|incentive| incentive.total_reward_unclaimed)
                .unwrap_or(0);
            incentives.push(IncentiveAudit {
                name: name.clone(),
                funded,
                paid: self.paid.get(name).copied().unwrap_or(0),
                refunded: self.refunded.get(name).copied(),
                remaining,
            });
        }
        incentives.sort_by(|a, b| a.name.cmp(&b.name));
        AuditReport { incentives }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;

    fn three_stakers_config() -> ScenarioConfig {
        toml::from_str(
            r#"
            name = "three equal stakers"
            genesis = 1700000000

            [[pools]]
            name = "pool-a"

            [[positions]]
            id = 1
            owner = "alice"
            pool = "pool-a"
            liquidity = 1000

            [[positions]]
            id = 2
            owner = "bob"
            pool = "pool-a"
            liquidity = 1000

            [[positions]]
            id = 3
            owner = "carol"
            pool = "pool-a"
            liquidity = 1000

            [[incentives]]
            name = "main"
            pool = "pool-a"
            reward_token = "rwd"
            funder = "funder"
            refundee = "funder"
            amount = 3000
            start_offset = 3600
            duration = 2592000

            [[actions]]
            at = 0
            op = "deposit"
            position = 1

            [[actions]]
            at = 0
            op = "deposit"
            position = 2

            [[actions]]
            at = 0
            op = "deposit"
            position = 3

            [[actions]]
            at = 3600
            op = "stake"
            position = 1
            incentive = "main"

            [[actions]]
            at = 3600
            op = "stake"
            position = 2
            incentive = "main"

            [[actions]]
            at = 3600
            op = "stake"
            position = 3
            incentive = "main"

            [[actions]]
            at = 2595600
            op = "unstake"
            position = 1
            incentive = "main"

            [[actions]]
            at = 2595600
            op = "unstake"
            position = 2
            incentive = "main"

            [[actions]]
            at = 2595600
            op = "unstake"
            position = 3
            incentive = "main"

            [[actions]]
            at = 2595601
            op = "end"
            incentive = "main"
        "#,
        )
        .unwrap()
    }

    #[test]
    fn test_three_stakers_scenario_conserves_funding() {
        let runner = ScenarioRunner::new(three_stakers_config()).unwrap();
        let report = runner.run().unwrap();

        assert!(report.conserved());
        let audit = &report.incentives[0];
        assert_eq!(audit.funded, 3000);
        assert_eq!(audit.paid + audit.refunded.unwrap(), 3000);
        assert_eq!(audit.remaining, 0);
    }
}
