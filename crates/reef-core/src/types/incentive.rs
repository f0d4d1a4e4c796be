//! Incentive programs and their structural keys

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::math::big_int::U256;
use crate::types::{Address, Timestamp};

/// Structural identity of an incentive program. Two creations with the same
/// key top up the same program; any field change names a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct IncentiveKey {
    /// Pool whose in-range liquidity is being incentivized
    pub pool: Address,
    /// Asset the program pays rewards in
    pub reward_asset: Address,
    /// First second at which liquidity accrues reward
    pub start_time: Timestamp,
    /// First second at which liquidity no longer accrues reward
    pub end_time: Timestamp,
    /// Recipient of whatever remains unclaimed when the program is ended
    pub refundee: Address,
}

impl IncentiveKey {
    /// Content hash of the key: SHA-256 over its canonical borsh encoding
    pub fn incentive_id(&self) -> IncentiveId {
        let encoded = self
            .try_to_vec()
            .expect("borsh encoding of a fixed-size key cannot fail");
        let digest = Sha256::digest(&encoded);
        IncentiveId(digest.into())
    }
}

/// Content-derived identifier of an incentive program
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncentiveId(pub [u8; 32]);

impl fmt::Display for IncentiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for IncentiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IncentiveId({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl FromStr for IncentiveId {
    type Err = super::address::ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IncentiveId(Address::from_str(s)?.0))
    }
}

impl Serialize for IncentiveId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IncentiveId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        IncentiveId::from_str(&s).map_err(de::Error::custom)
    }
}

/// Mutable accounting state of one incentive program
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incentive {
    /// Reward not yet attributed to any stake; refunded on end.
    /// Monotonically non-increasing between creations.
    pub total_reward_unclaimed: u128,
    /// Liquidity-seconds already attributed to settled stakes, X128
    pub total_seconds_claimed_x128: U256,
    /// Live stakes referencing this program; must reach zero before end
    pub number_of_stakes: u32,
}
