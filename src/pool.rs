//! Lending pool - the protocol's central ledger.
//!
//! Tracks supplier deposits, the unified position ledger (standalone
//! collateral escrow and collateralized loans share one id space), and
//! the protocol reserves. Collateral custody and valuation live in the
//! collateral manager; interest accrual in the reserve ledger; this
//! contract owns the state transitions.
//!
//! Every entry point runs to completion inside one host call: ledger
//! mutations are applied before any outgoing transfer or callback, and
//! any revert unwinds the whole operation.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::collateral::CollateralManagerContractRef;
use crate::errors::ProtocolError;
use crate::events::{
    Borrowed, CollateralDeposited, CollateralWithdrawn, Deposited, FlashLoanExecuted,
    LiquidatorSet, PositionLiquidated, Repaid, ReserveFactorUpdated, Withdrawn,
};
use crate::flash::{flash_fee, FlashLoanReceiverContractRef};
use crate::interest::{InterestRateModelContractRef, BPS};
use crate::liquidation;
use crate::oracle::PriceOracleContractRef;
use crate::registry::TokenRegistryContractRef;
use crate::reserve::{scale_debt, ReserveLedgerContractRef, INDEX_SCALE};
use crate::token::Cep18TokenContractRef;

/// Lifecycle of a position. Terminal states are final.
#[odra::odra_type]
pub enum PositionState {
    /// Open; collateral escrowed, debt (if any) outstanding
    Active,
    /// Loan collected in full, collateral returned
    Repaid,
    /// Closed by a liquidator
    Liquidated,
    /// Escrow fully withdrawn by the borrower
    Withdrawn,
}

/// One entry in the unified position ledger.
///
/// A standalone collateral deposit has no debt leg (`debt_asset` unset,
/// zero `principal`); a loan carries both legs. Ids start at 1 and are
/// never reused.
#[odra::odra_type]
pub struct Position {
    /// Ledger id
    pub id: u64,
    /// Owner of the escrow and the debt
    pub borrower: Address,
    /// Escrowed asset
    pub collateral_asset: Address,
    /// Currently escrowed amount
    pub collateral_amount: U256,
    /// Borrowed asset, if the position carries debt
    pub debt_asset: Option<Address>,
    /// Borrowed principal in base units
    pub principal: U256,
    /// Reserve index of the debt asset when the position opened
    pub index_at_open: U256,
    /// Requested term in seconds, informational
    pub duration_seconds: u64,
    /// Block time the position opened
    pub opened_at: u64,
    /// Lifecycle state
    pub state: PositionState,
}

/// Lending pool contract.
#[odra::module]
pub struct LendingPool {
    /// Token whitelist
    token_registry: Var<Address>,
    /// Price oracle
    price_oracle: Var<Address>,
    /// Interest rate model
    interest_rate_model: Var<Address>,
    /// Reserve index ledger
    reserve_ledger: Var<Address>,
    /// Collateral escrow and valuation
    collateral_manager: Var<Address>,
    /// Admin address
    admin: Var<Address>,
    /// Accounts allowed to liquidate
    liquidators: Mapping<Address, bool>,
    /// (account, asset) -> supplied amount
    deposits: Mapping<(Address, Address), U256>,
    /// asset -> supplier funds currently available
    liquidity: Mapping<Address, U256>,
    /// asset -> outstanding loan principal
    borrowed: Mapping<Address, U256>,
    /// asset -> protocol take (interest share and flash fees)
    protocol_reserves: Mapping<Address, U256>,
    /// Share of paid interest kept by the protocol, bps
    reserve_factor: Var<u64>,
    /// id -> position
    positions: Mapping<u64, Position>,
    /// Next position id, starts at 1
    position_counter: Var<u64>,
}

#[odra::module]
impl LendingPool {
    pub fn init(
        &mut self,
        token_registry: Address,
        price_oracle: Address,
        interest_rate_model: Address,
        reserve_ledger: Address,
        collateral_manager: Address,
    ) {
        let caller = self.env().caller();

        self.token_registry.set(token_registry);
        self.price_oracle.set(price_oracle);
        self.interest_rate_model.set(interest_rate_model);
        self.reserve_ledger.set(reserve_ledger);
        self.collateral_manager.set(collateral_manager);

        self.admin.set(caller);
        self.reserve_factor.set(1_000);
        self.position_counter.set(1);
    }

    // ========================================
    // Supplier Operations
    // ========================================

    /// Supplies `amount` of `asset` to the pool.
    pub fn deposit(&mut self, asset: Address, amount: U256) {
        if !self.registry().is_registered(asset) {
            self.env().revert(ProtocolError::UnsupportedAsset);
        }
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        self.accrue(asset);

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(caller, self.env().self_address(), amount);

        let key = (caller, asset);
        let balance = self.deposits.get(&key).unwrap_or_default();
        self.deposits.set(&key, balance + amount);
        self.liquidity
            .set(&asset, self.total_liquidity(asset) + amount);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Deposited {
            account: caller,
            asset,
            amount,
            timestamp,
        });
    }

    /// Returns `amount` of `asset` to the caller from their deposits.
    pub fn withdraw(&mut self, asset: Address, amount: U256) {
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let caller = self.env().caller();
        let key = (caller, asset);
        let balance = self.deposits.get(&key).unwrap_or_default();
        if balance < amount {
            self.env().revert(ProtocolError::InsufficientBalance);
        }

        self.accrue(asset);

        let liquidity = self.total_liquidity(asset);
        if liquidity < amount {
            self.env().revert(ProtocolError::InsufficientLiquidity);
        }

        self.deposits.set(&key, balance - amount);
        self.liquidity.set(&asset, liquidity - amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(caller, amount);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Withdrawn {
            account: caller,
            asset,
            amount,
            timestamp,
        });
    }

    // ========================================
    // Collateral Positions
    // ========================================

    /// Escrows `amount` of `asset` and opens a zero-debt position.
    /// Returns the new position id.
    pub fn deposit_collateral(&mut self, asset: Address, amount: U256) -> u64 {
        if !self.manager().is_supported(asset) {
            self.env().revert(ProtocolError::UnsupportedAsset);
        }
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let caller = self.env().caller();
        self.manager().lock_collateral(caller, asset, amount);

        let timestamp = self.env().get_block_time();
        let id = self.take_position_id();
        self.positions.set(
            &id,
            Position {
                id,
                borrower: caller,
                collateral_asset: asset,
                collateral_amount: amount,
                debt_asset: None,
                principal: U256::zero(),
                index_at_open: U256::from(INDEX_SCALE),
                duration_seconds: 0,
                opened_at: timestamp,
                state: PositionState::Active,
            },
        );

        self.env().emit_event(CollateralDeposited {
            position_id: id,
            borrower: caller,
            asset,
            amount,
            timestamp,
        });

        id
    }

    /// Releases `amount` of escrowed collateral from position `id` back
    /// to the borrower. A debt-bearing position must still meet its
    /// minimum ratio afterwards.
    pub fn withdraw_collateral(&mut self, id: u64, amount: U256) {
        let mut position = self.position_or_revert(id);

        if self.env().caller() != position.borrower {
            self.env().revert(ProtocolError::NotBorrower);
        }
        if !matches!(position.state, PositionState::Active) {
            self.env().revert(ProtocolError::PositionNotActive);
        }
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }
        if amount > position.collateral_amount {
            self.env().revert(ProtocolError::InsufficientCollateral);
        }

        let remaining = position.collateral_amount - amount;

        if let Some(debt_asset) = position.debt_asset {
            let index = self.accrue(debt_asset);
            let owed = scale_debt(position.principal, position.index_at_open, index);
            if !self.manager().meets_min_ratio(
                position.collateral_asset,
                remaining,
                debt_asset,
                owed,
            ) {
                self.env().revert(ProtocolError::InsufficientCollateral);
            }
        }

        position.collateral_amount = remaining;
        if remaining.is_zero() && position.principal.is_zero() {
            position.state = PositionState::Withdrawn;
        }
        let collateral_asset = position.collateral_asset;
        let borrower = position.borrower;
        self.positions.set(&id, position);

        self.manager()
            .release_collateral(borrower, collateral_asset, amount);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(CollateralWithdrawn {
            position_id: id,
            amount,
            timestamp,
        });
    }

    // ========================================
    // Borrowing
    // ========================================

    /// Opens a collateralized loan: escrows the collateral, records the
    /// position and releases the borrowed funds. Returns the position id.
    pub fn borrow(
        &mut self,
        debt_asset: Address,
        debt_amount: U256,
        collateral_asset: Address,
        collateral_amount: U256,
        duration_seconds: u64,
    ) -> u64 {
        if !self.registry().is_registered(debt_asset) {
            self.env().revert(ProtocolError::UnsupportedAsset);
        }
        if !self.manager().is_supported(collateral_asset) {
            self.env().revert(ProtocolError::UnsupportedCollateral);
        }
        if debt_amount.is_zero() || collateral_amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }
        if self.held_balance(debt_asset) < debt_amount {
            self.env().revert(ProtocolError::InsufficientLiquidity);
        }

        let index = self.accrue(debt_asset);

        if !self.manager().meets_min_ratio(
            collateral_asset,
            collateral_amount,
            debt_asset,
            debt_amount,
        ) {
            self.env().revert(ProtocolError::InsufficientCollateral);
        }

        let caller = self.env().caller();
        self.manager()
            .lock_collateral(caller, collateral_asset, collateral_amount);

        let timestamp = self.env().get_block_time();
        let id = self.take_position_id();
        self.positions.set(
            &id,
            Position {
                id,
                borrower: caller,
                collateral_asset,
                collateral_amount,
                debt_asset: Some(debt_asset),
                principal: debt_amount,
                index_at_open: index,
                duration_seconds,
                opened_at: timestamp,
                state: PositionState::Active,
            },
        );

        self.borrowed
            .set(&debt_asset, self.total_borrowed(debt_asset) + debt_amount);
        let liquidity = self.total_liquidity(debt_asset);
        self.liquidity
            .set(&debt_asset, liquidity.saturating_sub(debt_amount));

        let mut token = Cep18TokenContractRef::new(self.env(), debt_asset);
        token.transfer(caller, debt_amount);

        self.env().emit_event(Borrowed {
            position_id: id,
            borrower: caller,
            debt_asset,
            principal: debt_amount,
            collateral_asset,
            collateral_amount,
            duration_seconds,
            timestamp,
        });

        id
    }

    /// Collects the full amount owed on loan `id` in `asset` and returns
    /// the escrowed collateral to the borrower.
    pub fn repay(&mut self, id: u64, asset: Address) {
        let mut position = self.position_or_revert(id);

        if !matches!(position.state, PositionState::Active) || position.principal.is_zero() {
            self.env().revert(ProtocolError::LoanNotActive);
        }
        if self.env().caller() != position.borrower {
            self.env().revert(ProtocolError::NotBorrower);
        }
        let debt_asset = position
            .debt_asset
            .unwrap_or_revert_with(&self.env(), ProtocolError::LoanNotActive);
        if asset != debt_asset {
            self.env().revert(ProtocolError::AssetMismatch);
        }

        let index = self.accrue(debt_asset);
        let owed = scale_debt(position.principal, position.index_at_open, index);
        let interest = owed - position.principal;

        let caller = self.env().caller();
        let mut token = Cep18TokenContractRef::new(self.env(), debt_asset);
        token.transfer_from(caller, self.env().self_address(), owed);

        self.settle_debt(debt_asset, position.principal, interest);

        let collateral_asset = position.collateral_asset;
        let collateral_amount = position.collateral_amount;
        let borrower = position.borrower;
        position.collateral_amount = U256::zero();
        position.state = PositionState::Repaid;
        self.positions.set(&id, position);

        self.manager()
            .release_collateral(borrower, collateral_asset, collateral_amount);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Repaid {
            position_id: id,
            amount: owed,
            interest,
            timestamp,
        });
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Closes an under-collateralized loan. The caller pays the full
    /// amount owed and receives collateral worth the debt plus the
    /// configured bonus, capped at the escrowed amount; any excess goes
    /// back to the borrower.
    pub fn liquidate_position(&mut self, id: u64) {
        let liquidator = self.env().caller();
        if !self.is_liquidator(liquidator) {
            self.env().revert(ProtocolError::Unauthorized);
        }

        let mut position = self.position_or_revert(id);
        if !matches!(position.state, PositionState::Active) {
            self.env().revert(ProtocolError::PositionNotActive);
        }
        if position.principal.is_zero() {
            self.env().revert(ProtocolError::LoanNotActive);
        }
        let debt_asset = position
            .debt_asset
            .unwrap_or_revert_with(&self.env(), ProtocolError::LoanNotActive);

        let index = self.accrue(debt_asset);
        let owed = scale_debt(position.principal, position.index_at_open, index);
        let interest = owed - position.principal;

        if self.manager().meets_min_ratio(
            position.collateral_asset,
            position.collateral_amount,
            debt_asset,
            owed,
        ) {
            self.env().revert(ProtocolError::PositionHealthy);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), debt_asset);
        token.transfer_from(liquidator, self.env().self_address(), owed);

        self.settle_debt(debt_asset, position.principal, interest);

        // Convert the debt into collateral units at current prices; the
        // price scale cancels in the ratio.
        let oracle = self.oracle();
        let debt_price = oracle.get_price(debt_asset);
        let collateral_price = oracle.get_price(position.collateral_asset);
        let debt_in_collateral = owed * debt_price / collateral_price;

        let bonus_bps = self
            .manager()
            .get_config(position.collateral_asset)
            .liquidation_bonus_bps;
        let entitlement =
            liquidation::liquidation_amount(debt_in_collateral, position.collateral_amount, bonus_bps);
        let seized = liquidation::seizable(entitlement, position.collateral_amount);
        let refunded = position.collateral_amount - seized;

        let collateral_asset = position.collateral_asset;
        let borrower = position.borrower;
        position.collateral_amount = U256::zero();
        position.state = PositionState::Liquidated;
        self.positions.set(&id, position);

        self.manager()
            .release_collateral(liquidator, collateral_asset, seized);
        if !refunded.is_zero() {
            self.manager()
                .release_collateral(borrower, collateral_asset, refunded);
        }

        let timestamp = self.env().get_block_time();
        self.env().emit_event(PositionLiquidated {
            position_id: id,
            liquidator,
            debt_covered: owed,
            collateral_seized: seized,
            collateral_refunded: refunded,
            timestamp,
        });
    }

    // ========================================
    // Flash Loans
    // ========================================

    /// Lends `amount` of `asset` to `receiver` for the duration of its
    /// callback. The pool balance must come back with the fee on top or
    /// the whole operation, callback effects included, is undone.
    pub fn execute_flash_loan(
        &mut self,
        receiver: Address,
        asset: Address,
        amount: U256,
        data: Vec<u8>,
    ) {
        if !self.registry().is_registered(asset) {
            self.env().revert(ProtocolError::UnsupportedAsset);
        }
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let before = self.held_balance(asset);
        if before < amount {
            self.env().revert(ProtocolError::InsufficientLiquidity);
        }

        let fee = flash_fee(amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(receiver, amount);

        let initiator = self.env().caller();
        let mut callback = FlashLoanReceiverContractRef::new(self.env(), receiver);
        callback.on_flash_loan(initiator, asset, amount, fee, data);

        if self.held_balance(asset) < before + fee {
            self.env().revert(ProtocolError::FlashLoanNotRepaid);
        }

        self.protocol_reserves.set(&asset, self.reserves(asset) + fee);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(FlashLoanExecuted {
            receiver,
            asset,
            amount,
            fee,
            timestamp,
        });
    }

    // ========================================
    // View Functions
    // ========================================

    /// Supplied balance of `account` in `asset`.
    pub fn get_deposit(&self, account: Address, asset: Address) -> U256 {
        self.deposits.get(&(account, asset)).unwrap_or_default()
    }

    /// Position `id`, if it exists.
    pub fn get_position(&self, id: u64) -> Option<Position> {
        self.positions.get(&id)
    }

    /// Debt-bearing view over the position ledger: `None` for pure
    /// escrow positions.
    pub fn get_loan(&self, id: u64) -> Option<Position> {
        self.positions
            .get(&id)
            .filter(|position| !position.principal.is_zero())
    }

    /// Id the next created position will take.
    pub fn next_position_id(&self) -> u64 {
        self.position_counter.get_or_default()
    }

    /// Outstanding principal borrowed in `asset`.
    pub fn total_borrowed(&self, asset: Address) -> U256 {
        self.borrowed.get(&asset).unwrap_or_default()
    }

    /// Supplier funds currently available in `asset`.
    pub fn total_liquidity(&self, asset: Address) -> U256 {
        self.liquidity.get(&asset).unwrap_or_default()
    }

    /// Protocol take accumulated in `asset`.
    pub fn reserves(&self, asset: Address) -> U256 {
        self.protocol_reserves.get(&asset).unwrap_or_default()
    }

    /// Token balance the pool actually holds in `asset`.
    pub fn held_balance(&self, asset: Address) -> U256 {
        let token = Cep18TokenContractRef::new(self.env(), asset);
        token.balance_of(self.env().self_address())
    }

    /// Utilization of `asset` in bps: borrowed over borrowed plus
    /// available.
    pub fn utilization_bps(&self, asset: Address) -> u64 {
        let borrowed = self.total_borrowed(asset);
        if borrowed.is_zero() {
            return 0;
        }

        let total = borrowed + self.total_liquidity(asset);
        (borrowed * U256::from(BPS) / total).as_u64()
    }

    /// Current annual borrow rate for `asset`, bps.
    pub fn borrow_rate(&self, asset: Address) -> u64 {
        self.model().borrow_rate(self.utilization_bps(asset))
    }

    /// Current annual supply rate for `asset`, bps.
    pub fn supply_rate(&self, asset: Address) -> u64 {
        self.model().supply_rate(
            self.utilization_bps(asset),
            self.reserve_factor.get_or_default(),
        )
    }

    pub fn reserve_factor_bps(&self) -> u64 {
        self.reserve_factor.get_or_default()
    }

    pub fn is_liquidator(&self, account: Address) -> bool {
        self.liquidators.get(&account).unwrap_or(false)
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(ProtocolError::Unauthorized)
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// Sets the share of paid interest kept by the protocol.
    pub fn set_reserve_factor(&mut self, factor_bps: u64) {
        self.only_admin();

        if factor_bps > BPS {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let old_factor_bps = self.reserve_factor.get_or_default();
        self.reserve_factor.set(factor_bps);

        self.env().emit_event(ReserveFactorUpdated {
            old_factor_bps,
            new_factor_bps: factor_bps,
        });
    }

    /// Grants or revokes the liquidator capability.
    pub fn set_liquidator(&mut self, account: Address, enabled: bool) {
        self.only_admin();
        self.liquidators.set(&account, enabled);

        self.env().emit_event(LiquidatorSet { account, enabled });
    }

    // ========================================
    // Internals
    // ========================================

    /// Accrues the reserve index of `asset` at the current borrow rate
    /// and returns the fresh index. Called at the top of every operation
    /// that reads or changes debt.
    fn accrue(&mut self, asset: Address) -> U256 {
        let rate_bps = self.model().borrow_rate(self.utilization_bps(asset));
        self.reserve_ref().accrue(asset, rate_bps)
    }

    /// Books a repayment: principal leaves the borrow total; interest is
    /// split between supplier liquidity and protocol reserves.
    fn settle_debt(&mut self, asset: Address, principal: U256, interest: U256) {
        self.borrowed
            .set(&asset, self.total_borrowed(asset) - principal);

        let reserve_cut = interest * U256::from(self.reserve_factor.get_or_default())
            / U256::from(BPS);
        self.protocol_reserves
            .set(&asset, self.reserves(asset) + reserve_cut);
        self.liquidity.set(
            &asset,
            self.total_liquidity(asset) + principal + interest - reserve_cut,
        );
    }

    fn take_position_id(&mut self) -> u64 {
        let id = self.position_counter.get_or_default();
        self.position_counter.set(id + 1);
        id
    }

    fn position_or_revert(&self, id: u64) -> Position {
        self.positions
            .get(&id)
            .unwrap_or_revert_with(&self.env(), ProtocolError::PositionNotFound)
    }

    fn registry(&self) -> TokenRegistryContractRef {
        let address = self
            .token_registry
            .get_or_revert_with(ProtocolError::NotConfigured);
        TokenRegistryContractRef::new(self.env(), address)
    }

    fn oracle(&self) -> PriceOracleContractRef {
        let address = self
            .price_oracle
            .get_or_revert_with(ProtocolError::NotConfigured);
        PriceOracleContractRef::new(self.env(), address)
    }

    fn model(&self) -> InterestRateModelContractRef {
        let address = self
            .interest_rate_model
            .get_or_revert_with(ProtocolError::NotConfigured);
        InterestRateModelContractRef::new(self.env(), address)
    }

    fn reserve_ref(&self) -> ReserveLedgerContractRef {
        let address = self
            .reserve_ledger
            .get_or_revert_with(ProtocolError::NotConfigured);
        ReserveLedgerContractRef::new(self.env(), address)
    }

    fn manager(&self) -> CollateralManagerContractRef {
        let address = self
            .collateral_manager
            .get_or_revert_with(ProtocolError::NotConfigured);
        CollateralManagerContractRef::new(self.env(), address)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(ProtocolError::Unauthorized);
        if caller != admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}
