//! Scenario configuration loaded from TOML files
//!
//! A scenario declares pools, positions, and incentive programs, then a
//! timeline of ledger operations at offsets from a genesis timestamp. All
//! accounts are referred to by name; the environment derives stable addresses
//! from the names.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SimError, SimResult};

/// Top-level scenario file
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name for logging
    pub name: String,

    /// Timestamp the scenario clock starts at
    pub genesis: u64,

    /// Pools referenced by positions and incentives
    #[serde(default)]
    pub pools: Vec<PoolConfig>,

    /// Positions minted at genesis
    #[serde(default)]
    pub positions: Vec<PositionConfig>,

    /// Incentive programs created at genesis
    #[serde(default)]
    pub incentives: Vec<IncentiveConfig>,

    /// Timeline of operations, in offsets from genesis
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionConfig {
    pub id: u64,
    pub owner: String,
    pub pool: String,
    pub liquidity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncentiveConfig {
    /// Name the timeline uses to refer to this program
    pub name: String,
    pub pool: String,
    pub reward_token: String,
    pub funder: String,
    pub refundee: String,
    pub amount: u64,
    /// Program start, as an offset from genesis
    pub start_offset: u64,
    pub duration: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    /// Execution time, as an offset from genesis
    pub at: u64,
    #[serde(flatten)]
    pub op: Operation,
}

/// One timeline operation
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Hand a position to the staker's custody
    Deposit { position: u64 },
    /// Stake a deposited position into an incentive
    Stake { position: u64, incentive: String },
    /// Settle a stake; `by` overrides the caller for post-end settlement
    Unstake {
        position: u64,
        incentive: String,
        #[serde(default)]
        by: Option<String>,
    },
    /// Reassign deposit ownership
    Transfer { position: u64, to: String },
    /// Withdraw a position; `burn` also removes its liquidity from the pool
    Withdraw {
        position: u64,
        #[serde(default)]
        recipient: Option<String>,
        #[serde(default)]
        burn: bool,
    },
    /// Pay out accrued rewards
    Claim {
        actor: String,
        token: String,
        #[serde(default)]
        amount: Option<u64>,
    },
    /// End an incentive and refund the remainder
    End { incentive: String },
}

impl ScenarioConfig {
    /// Load and validate a scenario from a TOML file
    pub fn load(path: &Path) -> SimResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: ScenarioConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SimResult<()> {
        if self.name.is_empty() {
            return Err(SimError::InvalidConfig("scenario name is empty".into()));
        }

        let pools: HashSet<&str> = self.pools.iter().map(|p| p.name.as_str()).collect();
        if pools.len() != self.pools.len() {
            return Err(SimError::InvalidConfig("duplicate pool name".into()));
        }

        let mut position_ids = HashSet::new();
        for position in &self.positions {
            if !position_ids.insert(position.id) {
                return Err(SimError::InvalidConfig(format!(
                    "duplicate position id {}",
                    position.id
                )));
            }
            if !pools.contains(position.pool.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "position {} references unknown pool '{}'",
                    position.id, position.pool
                )));
            }
            if position.liquidity == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "position {} has zero liquidity",
                    position.id
                )));
            }
        }

        let mut incentive_names = HashSet::new();
        for incentive in &self.incentives {
            if !incentive_names.insert(incentive.name.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "duplicate incentive name '{}'",
                    incentive.name
                )));
            }
            if !pools.contains(incentive.pool.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "incentive '{}' references unknown pool '{}'",
                    incentive.name, incentive.pool
                )));
            }
            if incentive.amount == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "incentive '{}' has zero funding",
                    incentive.name
                )));
            }
            if incentive.duration == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "incentive '{}' has zero duration",
                    incentive.name
                )));
            }
        }

        for action in &self.actions {
            self.validate_action(action, &position_ids, &incentive_names)?;
        }

        Ok(())
    }

    fn validate_action(
        &self,
        action: &ActionConfig,
        position_ids: &HashSet<u64>,
        incentive_names: &HashSet<&str>,
    ) -> SimResult<()> {
        let check_position = |id: u64| {
            if position_ids.contains(&id) {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!(
                    "action at +{} references unknown position {}",
                    action.at, id
                )))
            }
        };
        let check_incentive = |name: &str| {
            if incentive_names.contains(name) {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!(
                    "action at +{} references unknown incentive '{}'",
                    action.at, name
                )))
            }
        };

        match &action.op {
            Operation::Deposit { position } | Operation::Transfer { position, .. } => {
                check_position(*position)
            }
            Operation::Withdraw { position, .. } => check_position(*position),
            Operation::Stake { position, incentive }
            | Operation::Unstake {
                position, incentive, ..
            } => {
                check_position(*position)?;
                check_incentive(incentive)
            }
            Operation::End { incentive } => check_incentive(incentive),
            Operation::Claim { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        name = "smoke"
        genesis = 1700000000

        [[pools]]
        name = "pool-a"

        [[positions]]
        id = 1
        owner = "alice"
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
        at = 3600
        op = "stake"
        position = 1
        incentive = "main"

        [[actions]]
        at = 2595600
        op = "unstake"
        position = 1
        incentive = "main"

        [[actions]]
        at = 2595600
        op = "claim"
        actor = "alice"
        token = "rwd"

        [[actions]]
        at = 2595601
        op = "end"
        incentive = "main"
    "#;

    #[test]
    fn test_parses_and_validates_example() {
        let config: ScenarioConfig = toml::from_str(EXAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.positions.len(), 1);
        assert_eq!(config.actions.len(), 5);
        assert!(matches!(config.actions[1].op, Operation::Stake { .. }));
    }

    #[test]
    fn test_rejects_unknown_references() {
        let mut config: ScenarioConfig = toml::from_str(EXAMPLE).unwrap();
        config.actions.push(ActionConfig {
            at: 10,
            op: Operation::Stake {
                position: 99,
                incentive: "main".into(),
            },
        });
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_liquidity_position() {
        let mut config: ScenarioConfig = toml::from_str(EXAMPLE).unwrap();
        config.positions[0].liquidity = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }
}
