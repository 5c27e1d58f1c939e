//! Flash loans - same-transaction uncollateralized borrowing.
//!
//! The pool lends from its own balance, invokes the receiver's callback,
//! and demands the balance back with a fee before the entry point ends.
//! Nothing here trusts the receiver: repayment is verified by balance
//! delta, and a shortfall voids the whole operation.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::interest::BPS;
use crate::token::Cep18TokenContractRef;

/// Flash loan fee, 0.09%.
pub const FLASH_FEE_BPS: u64 = 9;

/// Fee owed on a flash loan of `amount`.
pub fn flash_fee(amount: U256) -> U256 {
    amount * U256::from(FLASH_FEE_BPS) / U256::from(BPS)
}

/// Interface a flash-loan receiver contract must expose.
///
/// The pool calls this synchronously after transferring the funds. The
/// receiver may perform arbitrary operations, including calling back
/// into the pool, but must leave the pool holding at least
/// `amount + fee` of `asset` by the time it returns.
#[odra::external_contract]
pub trait FlashLoanReceiver {
    fn on_flash_loan(
        &mut self,
        initiator: Address,
        asset: Address,
        amount: U256,
        fee: U256,
        data: Vec<u8>,
    );
}

/// Test receiver: repays principal plus fee from its own balance, unless
/// told to withhold repayment.
#[odra::module]
pub struct MockFlashLoanReceiver {
    /// When set, the callback keeps the funds
    fail_repayment: Var<bool>,
    /// Amount seen by the last callback
    last_amount: Var<U256>,
    /// Fee seen by the last callback
    last_fee: Var<U256>,
}

#[odra::module]
impl MockFlashLoanReceiver {
    pub fn init(&mut self) {
        self.fail_repayment.set(false);
    }

    pub fn set_fail_repayment(&mut self, fail: bool) {
        self.fail_repayment.set(fail);
    }

    pub fn on_flash_loan(
        &mut self,
        _initiator: Address,
        asset: Address,
        amount: U256,
        fee: U256,
        _data: Vec<u8>,
    ) {
        self.last_amount.set(amount);
        self.last_fee.set(fee);

        if self.fail_repayment.get_or_default() {
            return;
        }

        let pool = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(pool, amount + fee);
    }

    pub fn last_amount(&self) -> U256 {
        self.last_amount.get_or_default()
    }

    pub fn last_fee(&self) -> U256 {
        self.last_fee.get_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(units: u64) -> U256 {
        U256::from(units) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn fee_is_nine_bps_floored() {
        assert_eq!(flash_fee(U256::from(10_000u64)), U256::from(9u64));
        assert_eq!(
            flash_fee(ether(100)),
            ether(100) * U256::from(9u64) / U256::from(10_000u64)
        );
    }

    #[test]
    fn fee_floors_to_zero_on_dust() {
        // 1111 * 9 / 10000 = 0
        assert_eq!(flash_fee(U256::from(1_111u64)), U256::zero());
    }

    #[test]
    fn fee_of_zero_is_zero() {
        assert_eq!(flash_fee(U256::zero()), U256::zero());
    }
}
