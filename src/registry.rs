//! Token registry - whitelist of assets the pool will touch.
//!
//! Registration is append-only. Assets are never removed so that
//! historical positions always reference a known asset.

use odra::prelude::*;
use crate::errors::ProtocolError;
use crate::events::AssetRegistered;

/// Token registry contract.
#[odra::module]
pub struct TokenRegistry {
    /// asset -> whitelisted
    assets: Mapping<Address, bool>,
    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl TokenRegistry {
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);
    }

    /// Whitelists `asset`. Idempotent; only the first call emits an event.
    pub fn register_asset(&mut self, asset: Address) {
        self.only_admin();

        if self.is_registered(asset) {
            return;
        }

        self.assets.set(&asset, true);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(AssetRegistered {
            asset,
            registered_by: self.env().caller(),
            timestamp,
        });
    }

    /// Whether `asset` has been whitelisted.
    pub fn is_registered(&self, asset: Address) -> bool {
        self.assets.get(&asset).unwrap_or(false)
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

    fn setup() -> (HostEnv, TokenRegistryHostRef) {
        let env = odra_test::env();
        let registry = TokenRegistry::deploy(&env, NoArgs);
        (env, registry)
    }

    #[test]
    fn register_is_admin_only() {
        let (env, mut registry) = setup();
        let asset = env.get_account(5);

        env.set_caller(env.get_account(1));
        assert_eq!(
            registry.try_register_asset(asset),
            Err(ProtocolError::Unauthorized.into())
        );
        assert!(!registry.is_registered(asset));
    }

    #[test]
    fn register_is_idempotent() {
        let (env, mut registry) = setup();
        let asset = env.get_account(5);

        registry.register_asset(asset);
        registry.register_asset(asset);

        assert!(registry.is_registered(asset));
    }

    #[test]
    fn unregistered_asset_reports_false() {
        let (env, registry) = setup();
        assert!(!registry.is_registered(env.get_account(7)));
    }
}
