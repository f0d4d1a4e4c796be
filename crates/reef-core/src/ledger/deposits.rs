//! Position custody ledger

use std::collections::HashMap;

use crate::errors::{StakerError, StakerResult};
use crate::types::{Address, Deposit, PositionId};

/// Custody records for positions handed to the staker
#[derive(Debug, Default)]
pub struct DepositLedger {
    deposits: HashMap<PositionId, Deposit>,
}

impl DepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position_id: PositionId) -> Option<&Deposit> {
        self.deposits.get(&position_id)
    }

    /// The deposit, or an error if the position is not in custody
    pub fn expect(&self, position_id: PositionId) -> StakerResult<&Deposit> {
        self.deposits
            .get(&position_id)
            .ok_or(StakerError::UnknownDeposit)
    }

    /// The deposit, after verifying `caller` is its recorded owner
    pub fn authorize(&self, position_id: PositionId, caller: Address) -> StakerResult<&Deposit> {
        let deposit = self.expect(position_id)?;
        if deposit.owner != caller {
            return Err(StakerError::NotOwner);
        }
        Ok(deposit)
    }

    /// Create the custody record for a newly deposited position
    pub fn record(&mut self, position_id: PositionId, owner: Address) -> StakerResult<()> {
        if self.deposits.contains_key(&position_id) {
            return Err(StakerError::DepositExists);
        }
        self.deposits.insert(position_id, Deposit::new(owner));
        Ok(())
    }

    /// Remove the record for withdrawal. Rejected while stakes remain.
    pub fn remove_idle(
        &mut self,
        position_id: PositionId,
        caller: Address,
    ) -> StakerResult<Deposit> {
        let deposit = self.authorize(position_id, caller)?;
        if deposit.number_of_stakes != 0 {
            return Err(StakerError::DepositStillStaked);
        }
        Ok(self
            .deposits
            .remove(&position_id)
            .expect("checked above"))
    }

    /// Unwind a removal whose position transfer failed
    pub fn restore(&mut self, position_id: PositionId, deposit: Deposit) {
        self.deposits.insert(position_id, deposit);
    }

    /// Unwind a [`record`](Self::record) whose custody transfer failed
    pub fn discard(&mut self, position_id: PositionId) {
        self.deposits.remove(&position_id);
    }

    /// Reassign ownership in place; stakes stay attached. Returns the
    /// previous owner.
    pub fn transfer(
        &mut self,
        position_id: PositionId,
        caller: Address,
        new_owner: Address,
    ) -> StakerResult<Address> {
        if new_owner.is_zero() {
            return Err(StakerError::InvalidRecipient);
        }
        self.authorize(position_id, caller)?;
        let deposit = self
            .deposits
            .get_mut(&position_id)
            .expect("authorized above");
        let old_owner = deposit.owner;
        deposit.owner = new_owner;
        Ok(old_owner)
    }

    pub fn increment_stakes(&mut self, position_id: PositionId) -> StakerResult<()> {
        let deposit = self
            .deposits
            .get_mut(&position_id)
            .ok_or(StakerError::UnknownDeposit)?;
        deposit.number_of_stakes = deposit
            .number_of_stakes
            .checked_add(1)
            .ok_or(StakerError::MathOverflow)?;
        Ok(())
    }

    pub fn decrement_stakes(&mut self, position_id: PositionId) -> StakerResult<()> {
        let deposit = self
            .deposits
            .get_mut(&position_id)
            .ok_or(StakerError::UnknownDeposit)?;
        deposit.number_of_stakes = deposit
            .number_of_stakes
            .checked_sub(1)
            .ok_or(StakerError::MathUnderflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::new([1u8; 32]);
    const BOB: Address = Address::new([2u8; 32]);

    #[test]
    fn test_record_rejects_double_deposit() {
        let mut ledger = DepositLedger::new();
        ledger.record(7, ALICE).unwrap();
        assert_eq!(ledger.record(7, BOB), Err(StakerError::DepositExists));
        assert_eq!(ledger.get(7).unwrap().owner, ALICE);
    }

    #[test]
    fn test_authorize() {
        let mut ledger = DepositLedger::new();
        ledger.record(7, ALICE).unwrap();
        assert!(ledger.authorize(7, ALICE).is_ok());
        assert_eq!(ledger.authorize(7, BOB), Err(StakerError::NotOwner));
        assert_eq!(ledger.authorize(8, ALICE), Err(StakerError::UnknownDeposit));
    }

    #[test]
    fn test_remove_idle_guards_staked_positions() {
        let mut ledger = DepositLedger::new();
        ledger.record(7, ALICE).unwrap();
        ledger.increment_stakes(7).unwrap();

        assert_eq!(
            ledger.remove_idle(7, ALICE),
            Err(StakerError::DepositStillStaked)
        );

        ledger.decrement_stakes(7).unwrap();
        let removed = ledger.remove_idle(7, ALICE).unwrap();
        assert_eq!(removed.owner, ALICE);
        assert!(ledger.get(7).is_none());
    }

    #[test]
    fn test_transfer_changes_owner_in_place() {
        let mut ledger = DepositLedger::new();
        ledger.record(7, ALICE).unwrap();
        ledger.increment_stakes(7).unwrap();

        assert_eq!(
            ledger.transfer(7, ALICE, Address::ZERO),
            Err(StakerError::InvalidRecipient)
        );
        assert_eq!(ledger.transfer(7, BOB, BOB), Err(StakerError::NotOwner));

        let old = ledger.transfer(7, ALICE, BOB).unwrap();
        assert_eq!(old, ALICE);
        // stakes remain attached across the transfer
        assert_eq!(ledger.get(7).unwrap().number_of_stakes, 1);
        assert_eq!(ledger.get(7).unwrap().owner, BOB);
    }

    #[test]
    fn test_decrement_underflow_is_checked() {
        let mut ledger = DepositLedger::new();
        ledger.record(7, ALICE).unwrap();
        assert_eq!(ledger.decrement_stakes(7), Err(StakerError::MathUnderflow));
    }
}
