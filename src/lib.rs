#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
//! Collateralized lending protocol.
//!
//! A suite of contracts around a central [`pool::LendingPool`] ledger:
//! whitelisted assets, push-updated prices with staleness enforcement,
//! a kinked interest rate model, a per-asset compounding reserve index,
//! collateral escrow with minimum-ratio checks, liquidation of
//! under-collateralized loans, and atomic flash loans.

extern crate alloc;

pub mod collateral;
pub mod errors;
pub mod events;
pub mod flash;
pub mod interest;
pub mod liquidation;
pub mod oracle;
pub mod pool;
pub mod registry;
pub mod reserve;
pub mod token;


pub use collateral::CollateralManager;
pub use errors::ProtocolError;
pub use interest::InterestRateModel;
pub use oracle::PriceOracle;
pub use pool::LendingPool;
pub use registry::TokenRegistry;
pub use reserve::ReserveLedger;
