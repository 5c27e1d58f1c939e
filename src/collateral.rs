//! Collateral manager - escrow and ratio checks for the lending pool.
//!
//! Holds the escrowed collateral tokens and the per-asset risk
//! configuration. Positions live in the pool; this contract only moves
//! funds on the pool's instruction and answers valuation questions.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::ProtocolError;
use crate::events::CollateralConfigured;
use crate::interest::BPS;
use crate::oracle::PriceOracleContractRef;
use crate::token::Cep18TokenContractRef;

/// Risk configuration for one collateral asset.
#[odra::odra_type]
pub struct CollateralConfig {
    /// Minimum collateral-to-debt ratio in bps, never below 10000
    pub min_ratio_bps: u64,
    /// Bonus granted to liquidators, bps
    pub liquidation_bonus_bps: u64,
    /// Whether the asset is accepted as collateral
    pub supported: bool,
}

/// Collateral manager contract.
#[odra::module]
pub struct CollateralManager {
    /// asset -> risk configuration
    configs: Mapping<Address, CollateralConfig>,
    /// asset -> total escrowed amount
    escrowed: Mapping<Address, U256>,
    /// Price oracle used for ratio checks
    price_oracle: Var<Address>,
    /// Pool allowed to move escrow
    pool: Var<Address>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl CollateralManager {
    pub fn init(&mut self, price_oracle: Address) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.price_oracle.set(price_oracle);
    }

    /// Wires the pool that may move escrowed funds.
    pub fn set_pool(&mut self, pool: Address) {
        self.only_admin();
        self.pool.set(pool);
    }

    // ========================================
    // Configuration (admin)
    // ========================================

    /// Accepts `asset` as collateral at `min_ratio_bps`, with
    /// `liquidation_bonus_bps` paid to liquidators. Ratios below 100%
    /// are rejected before any state change.
    pub fn configure_collateral(
        &mut self,
        asset: Address,
        min_ratio_bps: u64,
        liquidation_bonus_bps: u64,
    ) {
        self.only_admin();

        if min_ratio_bps < BPS {
            self.env().revert(ProtocolError::InvalidRatio);
        }

        self.configs.set(
            &asset,
            CollateralConfig {
                min_ratio_bps,
                liquidation_bonus_bps,
                supported: true,
            },
        );

        self.env().emit_event(CollateralConfigured {
            asset,
            min_ratio_bps,
            liquidation_bonus_bps,
            configured_by: self.env().caller(),
        });
    }

    /// Whether `asset` is configured as collateral.
    pub fn is_supported(&self, asset: Address) -> bool {
        self.configs
            .get(&asset)
            .map(|config| config.supported)
            .unwrap_or(false)
    }

    /// Risk configuration for `asset`.
    pub fn get_config(&self, asset: Address) -> CollateralConfig {
        self.configs
            .get(&asset)
            .unwrap_or_revert_with(&self.env(), ProtocolError::UnsupportedCollateral)
    }

    // ========================================
    // Escrow (pool only)
    // ========================================

    /// Pulls `amount` of `asset` from `owner` into escrow. The owner must
    /// have approved this contract beforehand.
    pub fn lock_collateral(&mut self, owner: Address, asset: Address, amount: U256) {
        self.only_pool();

        if !self.is_supported(asset) {
            self.env().revert(ProtocolError::UnsupportedCollateral);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer_from(owner, self.env().self_address(), amount);

        let held = self.total_escrowed(asset);
        self.escrowed.set(&asset, held + amount);
    }

    /// Releases `amount` of escrowed `asset` to `to`.
    pub fn release_collateral(&mut self, to: Address, asset: Address, amount: U256) {
        self.only_pool();

        let held = self.total_escrowed(asset);
        if held < amount {
            self.env().revert(ProtocolError::InsufficientCollateral);
        }
        self.escrowed.set(&asset, held - amount);

        let mut token = Cep18TokenContractRef::new(self.env(), asset);
        token.transfer(to, amount);
    }

    /// Total escrow held for `asset`.
    pub fn total_escrowed(&self, asset: Address) -> U256 {
        self.escrowed.get(&asset).unwrap_or_default()
    }

    // ========================================
    // Valuation
    // ========================================

    /// Whether `collateral_amount` of `collateral_asset`, valued at the
    /// current fresh oracle price, covers `debt_amount` of `debt_asset`
    /// at the configured minimum ratio.
    pub fn meets_min_ratio(
        &self,
        collateral_asset: Address,
        collateral_amount: U256,
        debt_asset: Address,
        debt_amount: U256,
    ) -> bool {
        let config = self.get_config(collateral_asset);

        let oracle_address = self
            .price_oracle
            .get_or_revert_with(ProtocolError::NotConfigured);
        let oracle = PriceOracleContractRef::new(self.env(), oracle_address);

        let collateral_value = oracle.asset_value(collateral_asset, collateral_amount);
        let debt_value = oracle.asset_value(debt_asset, debt_amount);

        collateral_value * U256::from(BPS) >= debt_value * U256::from(config.min_ratio_bps)
    }

    fn only_pool(&self) {
        let pool = self.pool.get_or_revert_with(ProtocolError::NotConfigured);
        if self.env().caller() != pool {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(ProtocolError::Unauthorized);
        if caller != admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}
