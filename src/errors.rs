//! Error types for the lending protocol.

use odra::prelude::*;

/// Errors surfaced by the protocol contracts.
///
/// Every failed entry point reverts with one of these; nothing is ever
/// reported as a generic failure.
#[odra::odra_error]
pub enum ProtocolError {
    // Validation
    /// Zero amount not allowed
    InvalidAmount = 1,
    /// Collateral ratio below 100%
    InvalidRatio = 2,
    /// Zero price rejected at write time
    InvalidPrice = 3,
    /// Batch asset/price arrays differ in length
    LengthMismatch = 4,
    /// Repayment asset does not match the loan's debt asset
    AssetMismatch = 5,

    // Authorization
    /// Caller is not the position's borrower
    NotBorrower = 10,
    /// Caller lacks the required role
    Unauthorized = 11,

    // State
    /// Asset not whitelisted for this operation
    UnsupportedAsset = 20,
    /// Asset not configured as collateral
    UnsupportedCollateral = 21,
    /// Position does not exist
    PositionNotFound = 22,
    /// Position is not in the Active state
    PositionNotActive = 23,
    /// Position carries no debt, or the loan is closed
    LoanNotActive = 24,
    /// Depositor ledger balance too small
    InsufficientBalance = 25,
    /// Pool does not hold enough of the asset
    InsufficientLiquidity = 26,
    /// Escrowed collateral too small, or ratio would be breached
    InsufficientCollateral = 27,
    /// Position meets its minimum ratio, cannot liquidate
    PositionHealthy = 28,
    /// Collaborator address not wired yet
    NotConfigured = 29,

    // Staleness
    /// No price has been pushed for the asset
    PriceFeedNotAvailable = 40,
    /// Stored price older than the freshness window
    StalePrice = 41,

    // Invariant violations
    /// Flash loan balance delta below principal + fee
    FlashLoanNotRepaid = 50,
}

/// Errors for the CEP-18 mock token used as the transfer service in tests.
#[odra::odra_error]
pub enum TokenError {
    /// Sender balance too small
    InsufficientBalance = 1,
    /// Spender allowance too small
    InsufficientAllowance = 2,
}
