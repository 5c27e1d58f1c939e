//! Price oracle - push-updated asset prices with staleness enforcement.
//!
//! Prices carry 8 fractional digits. Solvency-critical valuation must go
//! through [`PriceOracle::get_price`] / [`PriceOracle::asset_value`];
//! `get_price_unsafe` exists for diagnostics and liquidation triage only.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::ProtocolError;
use crate::events::PriceUpdated;

/// Fixed-point scale of stored prices (8 fractional digits).
pub const PRICE_SCALE: u64 = 100_000_000;

/// Maximum age of a usable price, in block-time milliseconds (one hour).
pub const MAX_PRICE_AGE: u64 = 3_600_000;

/// A pushed price observation.
#[odra::odra_type]
pub struct PriceRecord {
    /// Price in 1e8 fixed point, strictly positive
    pub price: U256,
    /// Block time the price was observed
    pub observed_at: u64,
}

/// Price oracle contract.
#[odra::module]
pub struct PriceOracle {
    /// asset -> latest observation
    records: Mapping<Address, PriceRecord>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl PriceOracle {
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);
    }

    /// Pushes a price for `asset`, overwriting any prior record.
    pub fn update_price(&mut self, asset: Address, price: U256) {
        self.only_admin();
        self.store_price(asset, price);
    }

    /// Pushes one price per asset. The arrays must pair up; any bad entry
    /// reverts the whole batch.
    pub fn update_prices(&mut self, assets: Vec<Address>, prices: Vec<U256>) {
        self.only_admin();

        if assets.len() != prices.len() {
            self.env().revert(ProtocolError::LengthMismatch);
        }

        for (asset, price) in assets.into_iter().zip(prices.into_iter()) {
            self.store_price(asset, price);
        }
    }

    /// Latest price for `asset`, rejecting records older than
    /// [`MAX_PRICE_AGE`]. A record exactly at the limit is still fresh.
    pub fn get_price(&self, asset: Address) -> U256 {
        let record = self
            .records
            .get(&asset)
            .unwrap_or_revert_with(&self.env(), ProtocolError::PriceFeedNotAvailable);

        let now = self.env().get_block_time();
        if now - record.observed_at > MAX_PRICE_AGE {
            self.env().revert(ProtocolError::StalePrice);
        }

        record.price
    }

    /// Stored price and its age, with no freshness check. Callers apply
    /// their own policy; never valid for solvency decisions.
    pub fn get_price_unsafe(&self, asset: Address) -> (U256, u64) {
        let record = self
            .records
            .get(&asset)
            .unwrap_or_revert_with(&self.env(), ProtocolError::PriceFeedNotAvailable);

        let age = self.env().get_block_time() - record.observed_at;
        (record.price, age)
    }

    /// Value of `amount` base units at the current fresh price.
    pub fn asset_value(&self, asset: Address, amount: U256) -> U256 {
        let price = self.get_price(asset);
        amount * price / U256::from(PRICE_SCALE)
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(ProtocolError::Unauthorized)
    }

    fn store_price(&mut self, asset: Address, price: U256) {
        if price.is_zero() {
            self.env().revert(ProtocolError::InvalidPrice);
        }

        let timestamp = self.env().get_block_time();
        self.records.set(
            &asset,
            PriceRecord {
                price,
                observed_at: timestamp,
            },
        );

        self.env().emit_event(PriceUpdated {
            asset,
            price,
            timestamp,
        });
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(ProtocolError::Unauthorized);
        if caller != admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}
