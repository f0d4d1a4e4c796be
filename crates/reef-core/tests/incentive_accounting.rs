//! Accounting scenarios: conservation of funded rewards, proportional
//! apportionment, and the restake/no-double-count guarantees.

mod common;

use common::{new_staker, TestEnv};
use reef_core::{Address, IncentiveKey, Staker, SECONDS_PER_DAY};

const START: u64 = 10_000;
const DURATION: u64 = 30 * SECONDS_PER_DAY;
const END: u64 = START + DURATION;
const TOTAL_REWARD: u128 = 3_000;

const POOL: Address = Address::new([0x01; 32]);
const REWARD_TOKEN: Address = Address::new([0x02; 32]);
const FUNDER: Address = Address::new([0x0f; 32]);

fn owner(index: u8) -> Address {
    Address::new([0xa0 + index; 32])
}

fn standard_key() -> IncentiveKey {
    IncentiveKey {
        pool: POOL,
        reward_asset: REWARD_TOKEN,
        start_time: START,
        end_time: END,
        refundee: FUNDER,
    }
}

/// Staker with the standard incentive funded and `liquidities.len()`
/// positions (ids 1..) minted to distinct owners and deposited
fn staker_with_positions(liquidities: &[u128]) -> (Staker<TestEnv>, IncentiveKey) {
    let mut staker = new_staker();
    staker.env_mut().mint(REWARD_TOKEN, FUNDER, TOTAL_REWARD);
    staker.env_mut().create_pool(POOL);

    let key = standard_key();
    staker.create_incentive(FUNDER, key, TOTAL_REWARD, 1_000).unwrap();

    for (index, &liquidity) in liquidities.iter().enumerate() {
        let position_id = index as u64 + 1;
        let holder = owner(index as u8);
        staker
            .env_mut()
            .mint_position(position_id, holder, POOL, liquidity, 5_000);
        staker.deposit_position(position_id, holder).unwrap();
    }
    (staker, key)
}

#[test]
fn scenario_a_three_equal_stakes_held_for_the_full_duration() {
    let (mut staker, key) = staker_with_positions(&[1_000, 1_000, 1_000]);

    for position_id in 1..=3 {
        staker
            .stake(owner(position_id as u8 - 1), key, position_id, START)
            .unwrap();
    }

    let mut rewards = Vec::new();
    for position_id in 1..=3 {
        rewards.push(
            staker
                .unstake(owner(position_id as u8 - 1), key, position_id, END)
                .unwrap(),
        );
    }
    let refund = staker.end_incentive(key, END + 1).unwrap();

    assert_eq!(rewards, vec![1_000, 1_000, 1_000]);
    assert_eq!(rewards.iter().sum::<u128>() + refund, TOTAL_REWARD);
}

#[test]
fn scenario_a_with_late_unstakes_stays_conserved() {
    let (mut staker, key) = staker_with_positions(&[1_000, 1_000, 1_000]);

    for position_id in 1..=3 {
        staker
            .stake(owner(position_id as u8 - 1), key, position_id, START)
            .unwrap();
    }

    // settled only a minute after the program ended; each share decays by at
    // most the floor-rounding of the late margin
    let mut rewards = Vec::new();
    for position_id in 1..=3 {
        rewards.push(
            staker
                .unstake(owner(position_id as u8 - 1), key, position_id, END + 60)
                .unwrap(),
        );
    }
    let refund = staker.end_incentive(key, END + 61).unwrap();

    for &reward in &rewards {
        assert!((999..=1_000).contains(&reward), "reward was {reward}");
    }
    assert_eq!(rewards.iter().sum::<u128>() + refund, TOTAL_REWARD);
}

#[test]
fn scenario_b_early_exit_redistributes_to_the_holders() {
    let (mut staker, key) = staker_with_positions(&[1_000, 1_000, 1_000]);
    let halfway = START + DURATION / 2;

    for position_id in 1..=3 {
        staker
            .stake(owner(position_id as u8 - 1), key, position_id, START)
            .unwrap();
    }

    // position 1 exits at half duration and pulls its liquidity out of the
    // pool entirely
    let reward_1 = staker.unstake(owner(0), key, 1, halfway).unwrap();
    staker.withdraw_position(owner(0), 1, owner(0)).unwrap();
    staker.env_mut().burn_position(1, halfway);

    let reward_2 = staker.unstake(owner(1), key, 2, END).unwrap();
    let reward_3 = staker.unstake(owner(2), key, 3, END).unwrap();
    let refund = staker.end_incentive(key, END + 1).unwrap();

    // 1/3 of the pool for 1/2 the time; the holders split the remainder
    assert_eq!(reward_1, 500);
    assert_eq!(reward_2, 1_250);
    assert_eq!(reward_3, 1_250);
    assert_eq!(reward_1 + reward_2 + reward_3 + refund, TOTAL_REWARD);
}

#[test]
fn scenario_c_late_unstake_is_capped_at_end_time() {
    let (mut staker, key) = staker_with_positions(&[1_000]);
    staker.stake(owner(0), key, 1, START).unwrap();

    // seconds are sampled at end_time, not at the settlement instant, so the
    // reward stays positive but decays as the denominator keeps growing
    let preview_at_end = staker.get_reward_amount(key, 1, END).unwrap();
    let reward = staker.unstake(owner(0), key, 1, END + 1_000).unwrap();

    assert!(reward > 0);
    assert!(reward < preview_at_end.reward);
    assert_eq!(
        preview_at_end.seconds_inside_x128,
        staker.incentive(&key).unwrap().total_seconds_claimed_x128
    );

    let refund = staker.end_incentive(key, END + 1_001).unwrap();
    assert_eq!(reward + refund, TOTAL_REWARD);
}

#[test]
fn rewards_are_proportional_to_liquidity() {
    let (mut staker, key) = staker_with_positions(&[2_000, 1_000]);

    staker.stake(owner(0), key, 1, START).unwrap();
    staker.stake(owner(1), key, 2, START).unwrap();

    let reward_1 = staker.unstake(owner(0), key, 1, END).unwrap();
    let reward_2 = staker.unstake(owner(1), key, 2, END).unwrap();

    // equal time in range, liquidity 2:1 -> rewards 2:1 (within rounding)
    assert!(reward_1.abs_diff(2 * reward_2) <= 2, "{reward_1} vs {reward_2}");
    assert_eq!(
        reward_1 + reward_2 + staker.end_incentive(key, END + 1).unwrap(),
        TOTAL_REWARD
    );
}

#[test]
fn restaking_at_the_same_instant_neither_drops_nor_duplicates_seconds() {
    let (mut staker, key) = staker_with_positions(&[1_000]);
    let halfway = START + DURATION / 2;

    staker.stake(owner(0), key, 1, START).unwrap();
    let first = staker.unstake(owner(0), key, 1, halfway).unwrap();

    // same-instant churn: unstake and restake without any time passing
    staker.stake(owner(0), key, 1, halfway).unwrap();
    let churn = staker.unstake(owner(0), key, 1, halfway).unwrap();
    assert_eq!(churn, 0);
    staker.stake(owner(0), key, 1, halfway).unwrap();

    let second = staker.unstake(owner(0), key, 1, END).unwrap();
    let refund = staker.end_incentive(key, END + 1).unwrap();

    // the two halves add back up to the whole program
    assert_eq!(first, 1_500);
    assert_eq!(second, 1_500);
    assert_eq!(first + churn + second + refund, TOTAL_REWARD);
    assert_eq!(refund, 0);
}

#[test]
fn late_stakers_dilute_earlier_ones_relative_to_elapsed_time() {
    let (mut staker, key) = staker_with_positions(&[1_000, 1_000]);
    let halfway = START + DURATION / 2;

    staker.stake(owner(0), key, 1, START).unwrap();
    staker.stake(owner(1), key, 2, halfway).unwrap();

    let reward_1 = staker.unstake(owner(0), key, 1, END).unwrap();
    let reward_2 = staker.unstake(owner(1), key, 2, END).unwrap();
    let refund = staker.end_incentive(key, END + 1).unwrap();

    // both positions sat in the pool the whole time, but position 2 only
    // staked for the second half, so it forfeits that half's share
    assert!(reward_1 > reward_2);
    assert_eq!(reward_1 + reward_2 + refund, TOTAL_REWARD);
    assert!(refund > 0, "unstaked first-half seconds stay unclaimed");
}
