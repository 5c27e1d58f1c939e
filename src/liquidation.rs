//! Liquidation math - pure payout calculations.

use odra::casper_types::U256;
use crate::interest::BPS;

/// Value a liquidator is entitled to extract for covering `debt`, with
/// the configured bonus applied. Zero when the position holds no
/// collateral. The result is intentionally not bounded by `collateral`;
/// callers cap the actual seizure at what is escrowed.
pub fn liquidation_amount(debt: U256, collateral: U256, bonus_bps: u64) -> U256 {
    if collateral.is_zero() {
        return U256::zero();
    }

    debt * U256::from(BPS + bonus_bps) / U256::from(BPS)
}

/// Portion of the entitlement that can actually be seized.
pub fn seizable(entitlement: U256, collateral: U256) -> U256 {
    if entitlement < collateral {
        entitlement
    } else {
        collateral
    }
}
