//! Fungible asset transfer service.
//!
//! The protocol never moves value itself; it drives any CEP-18 token
//! through the [`Cep18Token`] interface. Transfers either fully succeed
//! or revert the calling entry point. [`MockToken`] is a freely mintable
//! CEP-18 implementation used by the test suites and deploy scenarios.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::TokenError;
use crate::events::{Approval, Transfer};

/// External CEP-18 interface consumed by the protocol contracts.
#[odra::external_contract]
pub trait Cep18Token {
    /// Balance held by `owner`.
    fn balance_of(&self, owner: Address) -> U256;

    /// Moves `amount` from the caller to `to`.
    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    /// Moves `amount` from `from` to `to`, consuming the caller's allowance.
    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    /// Grants `spender` the right to move `amount` of the caller's balance.
    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    /// Remaining allowance granted by `owner` to `spender`.
    fn allowance(&self, owner: Address, spender: Address) -> U256;
}

/// Mintable CEP-18 token. Faucet-style `mint` keeps test setup short;
/// nothing in the protocol assumes supply is guarded.
#[odra::module]
pub struct MockToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Fractional digits
    decimals: Var<u8>,
    /// Total minted supply
    total_supply: Var<U256>,
    /// owner -> balance
    balances: Mapping<Address, U256>,
    /// (owner, spender) -> remaining allowance
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Creates `amount` new units for `to`.
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.total_supply.set(self.total_supply() + amount);
        self.balances.set(&to, self.balance_of(to) + amount);

        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.move_balance(caller, to, amount);
        true
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        let allowance = self.allowance(from, caller);
        if allowance < amount {
            self.env().revert(TokenError::InsufficientAllowance);
        }

        self.set_allowance(from, caller, allowance - amount);
        self.move_balance(from, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.set_allowance(caller, spender, amount);
        true
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(TokenError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        self.balances.set(&to, self.balance_of(to) + amount);

        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);

        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv};

    fn setup() -> (HostEnv, MockTokenHostRef) {
        let env = odra_test::env();
        let token = MockToken::deploy(
            &env,
            MockTokenInitArgs {
                name: String::from("Test Asset"),
                symbol: String::from("TST"),
                decimals: 18,
            },
        );
        (env, token)
    }

    #[test]
    fn mint_credits_balance_and_supply() {
        let (env, mut token) = setup();
        let user = env.get_account(1);

        token.mint(user, U256::from(1_000));

        assert_eq!(token.balance_of(user), U256::from(1_000));
        assert_eq!(token.total_supply(), U256::from(1_000));
    }

    #[test]
    fn transfer_moves_funds_between_accounts() {
        let (env, mut token) = setup();
        let sender = env.get_account(1);
        let recipient = env.get_account(2);
        token.mint(sender, U256::from(1_000));

        env.set_caller(sender);
        token.transfer(recipient, U256::from(400));

        assert_eq!(token.balance_of(sender), U256::from(600));
        assert_eq!(token.balance_of(recipient), U256::from(400));
    }

    #[test]
    fn transfer_from_requires_allowance() {
        let (env, mut token) = setup();
        let owner = env.get_account(1);
        let spender = env.get_account(2);
        token.mint(owner, U256::from(1_000));

        env.set_caller(spender);
        assert_eq!(
            token.try_transfer_from(owner, spender, U256::from(100)),
            Err(TokenError::InsufficientAllowance.into())
        );

        env.set_caller(owner);
        token.approve(spender, U256::from(100));

        env.set_caller(spender);
        token.transfer_from(owner, spender, U256::from(100));
        assert_eq!(token.balance_of(spender), U256::from(100));
        assert_eq!(token.allowance(owner, spender), U256::zero());
    }

    #[test]
    fn transfer_rejects_overdraw() {
        let (env, mut token) = setup();
        let sender = env.get_account(1);
        let recipient = env.get_account(2);
        token.mint(sender, U256::from(10));

        env.set_caller(sender);
        assert_eq!(
            token.try_transfer(recipient, U256::from(11)),
            Err(TokenError::InsufficientBalance.into())
        );
        assert_eq!(token.balance_of(sender), U256::from(10));
    }
}
