//! Reserve ledger - per-asset compounding interest index.
//!
//! Each asset carries an index starting at 1.0 (1e18 scale) that only the
//! pool may advance. Within one accrual interval growth is linear in
//! elapsed time; successive accruals compound. A loan's debt is the
//! principal rescaled by the index movement since it opened.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::ProtocolError;
use crate::events::ReserveAccrued;
use crate::interest::BPS;

/// Fixed-point scale of reserve indexes.
pub const INDEX_SCALE: u128 = 1_000_000_000_000_000_000;

/// One year of block time, in milliseconds.
pub const MILLIS_PER_YEAR: u64 = 31_536_000_000;

/// Accrual state for one asset.
#[odra::odra_type]
pub struct ReserveState {
    /// Compounding index, 1e18 scale
    pub index: U256,
    /// Block time of the last accrual
    pub last_accrual_at: u64,
}

/// Advances `index` by `rate_bps` over `dt_millis`.
///
/// Deterministic and monotonic non-decreasing in `dt_millis`; a zero
/// interval returns the index unchanged.
pub fn compound(index: U256, rate_bps: u64, dt_millis: u64) -> U256 {
    let growth = index * U256::from(rate_bps) * U256::from(dt_millis)
        / (U256::from(BPS) * U256::from(MILLIS_PER_YEAR));
    index + growth
}

/// Amount owed on `principal` after the index moved from `opened_index`
/// to `current_index`.
pub fn scale_debt(principal: U256, opened_index: U256, current_index: U256) -> U256 {
    principal * current_index / opened_index
}

/// Reserve ledger contract.
#[odra::module]
pub struct ReserveLedger {
    /// asset -> accrual state
    reserves: Mapping<Address, ReserveState>,
    /// Pool allowed to drive accrual
    pool: Var<Address>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl ReserveLedger {
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);
    }

    /// Wires the pool that may call [`ReserveLedger::accrue`].
    pub fn set_pool(&mut self, pool: Address) {
        self.only_admin();
        self.pool.set(pool);
    }

    /// Accrues interest on `asset` at `rate_bps` since the last accrual
    /// and returns the new index. First touch seeds the index at 1.0.
    pub fn accrue(&mut self, asset: Address, rate_bps: u64) -> U256 {
        self.only_pool();

        let now = self.env().get_block_time();
        let state = self.reserves.get(&asset).unwrap_or(ReserveState {
            index: U256::from(INDEX_SCALE),
            last_accrual_at: now,
        });

        let index = compound(state.index, rate_bps, now - state.last_accrual_at);
        self.reserves.set(
            &asset,
            ReserveState {
                index,
                last_accrual_at: now,
            },
        );

        self.env().emit_event(ReserveAccrued {
            asset,
            rate_bps,
            index,
            timestamp: now,
        });

        index
    }

    /// Index as of the last accrual; 1.0 for untouched assets.
    pub fn current_index(&self, asset: Address) -> U256 {
        self.reserves
            .get(&asset)
            .map(|state| state.index)
            .unwrap_or(U256::from(INDEX_SCALE))
    }

    /// Block time of the last accrual, zero for untouched assets.
    pub fn last_accrual_at(&self, asset: Address) -> u64 {
        self.reserves
            .get(&asset)
            .map(|state| state.last_accrual_at)
            .unwrap_or(0)
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
