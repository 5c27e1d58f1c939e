//! Interest rate model - two-slope kinked curve over utilization.
//!
//! Rates and utilization are expressed in basis points. Below the kink the
//! rate climbs at `multiplier`; past it the excess utilization is charged
//! at `jump_multiplier`. All divisions floor.

use odra::prelude::*;
use crate::errors::ProtocolError;
use crate::events::RatesUpdated;

/// Basis-point denominator.
pub const BPS: u64 = 10_000;

/// Rate curve parameters, replaced as a unit.
#[odra::odra_type]
pub struct RateParams {
    /// Rate at zero utilization, bps
    pub base_rate_bps: u64,
    /// Slope below the kink, bps
    pub multiplier_bps: u64,
    /// Slope applied to utilization above the kink, bps
    pub jump_multiplier_bps: u64,
    /// Utilization where the slope changes, bps
    pub kink_bps: u64,
}

/// Interest rate model contract.
#[odra::module]
pub struct InterestRateModel {
    /// Current curve parameters
    params: Var<RateParams>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl InterestRateModel {
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);

        // Launch defaults: 2% base, 10% slope, 50% jump slope, 80% kink.
        self.params.set(RateParams {
            base_rate_bps: 200,
            multiplier_bps: 1_000,
            jump_multiplier_bps: 5_000,
            kink_bps: 8_000,
        });
    }

    /// Replaces the whole parameter set. No partial updates.
    pub fn update_rates(
        &mut self,
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    ) {
        self.only_admin();

        self.params.set(RateParams {
            base_rate_bps,
            multiplier_bps,
            jump_multiplier_bps,
            kink_bps,
        });

        self.env().emit_event(RatesUpdated {
            base_rate_bps,
            multiplier_bps,
            jump_multiplier_bps,
            kink_bps,
        });
    }

    /// Annual borrow rate in bps at `utilization_bps`.
    pub fn borrow_rate(&self, utilization_bps: u64) -> u64 {
        let p = self.get_params();

        // Widened intermediates; the curve itself stays within u64 for any
        // representable bps input.
        let base = p.base_rate_bps as u128;
        let mult = p.multiplier_bps as u128;
        let jump = p.jump_multiplier_bps as u128;
        let kink = p.kink_bps as u128;
        let util = utilization_bps as u128;

        let rate = if util <= kink {
            base + util * mult / BPS as u128
        } else {
            let normal = base + kink * mult / BPS as u128;
            let excess = util - kink;
            normal + excess * jump / BPS as u128
        };

        rate as u64
    }

    /// Annual supply rate in bps: the borrow rate net of the reserve
    /// factor, weighted by utilization. Reserve factors above 100% clamp
    /// the pool share at zero.
    pub fn supply_rate(&self, utilization_bps: u64, reserve_factor_bps: u64) -> u64 {
        let borrow = self.borrow_rate(utilization_bps) as u128;
        let to_pool_share = (BPS as u128).saturating_sub(reserve_factor_bps as u128);

        let rate_to_pool = borrow * to_pool_share / BPS as u128;
        (utilization_bps as u128 * rate_to_pool / BPS as u128) as u64
    }

    pub fn get_params(&self) -> RateParams {
        self.params.get_or_revert_with(ProtocolError::NotConfigured)
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(ProtocolError::Unauthorized)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(ProtocolError::Unauthorized);
        if caller != admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostEnv, NoArgs};

    fn setup() -> (HostEnv, InterestRateModelHostRef) {
        let env = odra_test::env();
        let model = InterestRateModel::deploy(&env, NoArgs);
        (env, model)
    }

    #[test]
    fn deploys_with_default_params() {
        let (_, model) = setup();
        let p = model.get_params();

        assert_eq!(p.base_rate_bps, 200);
        assert_eq!(p.multiplier_bps, 1_000);
        assert_eq!(p.jump_multiplier_bps, 5_000);
        assert_eq!(p.kink_bps, 8_000);
    }

    #[test]
    fn borrow_rate_at_zero_utilization_is_base() {
        let (_, model) = setup();
        assert_eq!(model.borrow_rate(0), 200);
    }

    #[test]
    fn borrow_rate_below_kink() {
        let (_, model) = setup();
        // 200 + 5000 * 1000 / 10000 = 700
        assert_eq!(model.borrow_rate(5_000), 700);
    }

    #[test]
    fn borrow_rate_at_full_utilization() {
        let (_, model) = setup();
        // normal = 200 + 8000 * 1000 / 10000 = 1000
        // excess = 2000; 2000 * 5000 / 10000 = 1000
        assert_eq!(model.borrow_rate(10_000), 2_000);
    }

    #[test]
    fn borrow_rate_is_monotonic_over_full_range() {
        let (_, model) = setup();

        let mut previous = model.borrow_rate(0);
        for utilization in 1..=10_000u64 {
            let rate = model.borrow_rate(utilization);
            assert!(rate >= previous, "rate dipped at {utilization} bps");
            previous = rate;
        }
    }

    #[test]
    fn supply_rate_nets_out_reserve_factor() {
        let (_, model) = setup();
        // borrow = 700; to pool = 700 * 9000 / 10000 = 630
        // supply = 5000 * 630 / 10000 = 315
        assert_eq!(model.supply_rate(5_000, 1_000), 315);
    }

    #[test]
    fn supply_rate_clamps_full_reserve_factor() {
        let (_, model) = setup();
        assert_eq!(model.supply_rate(5_000, 10_000), 0);
        assert_eq!(model.supply_rate(5_000, 12_000), 0);
    }

    #[test]
    fn update_rates_replaces_params_as_a_unit() {
        let (_, mut model) = setup();

        model.update_rates(100, 800, 4_000, 7_000);

        let p = model.get_params();
        assert_eq!(p.base_rate_bps, 100);
        assert_eq!(p.multiplier_bps, 800);
        assert_eq!(p.jump_multiplier_bps, 4_000);
        assert_eq!(p.kink_bps, 7_000);
    }

    #[test]
    fn update_rates_is_admin_only() {
        let (env, mut model) = setup();

        env.set_caller(env.get_account(1));
        assert_eq!(
            model.try_update_rates(0, 0, 0, 0),
            Err(ProtocolError::Unauthorized.into())
        );
    }
}
