//! Events for the lending protocol.
//!
//! Every mutating entry point emits exactly one of these records on
//! success, carrying its arguments and any ids it produced.

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Registry / Configuration Events
// ============================================================================

/// Event emitted the first time an asset is whitelisted.
#[odra::event]
pub struct AssetRegistered {
    /// Whitelisted asset
    pub asset: Address,
    /// Admin that registered it
    pub registered_by: Address,
    /// Timestamp of registration
    pub timestamp: u64,
}

/// Event emitted when an asset's collateral parameters are set.
#[odra::event]
pub struct CollateralConfigured {
    /// Collateral asset
    pub asset: Address,
    /// Minimum collateral ratio in bps (>= 10000)
    pub min_ratio_bps: u64,
    /// Liquidator bonus in bps
    pub liquidation_bonus_bps: u64,
    /// Admin that configured it
    pub configured_by: Address,
}

/// Event emitted when the interest rate parameters are replaced.
#[odra::event]
pub struct RatesUpdated {
    /// New base rate in bps
    pub base_rate_bps: u64,
    /// New multiplier in bps
    pub multiplier_bps: u64,
    /// New jump multiplier in bps
    pub jump_multiplier_bps: u64,
    /// New kink utilization in bps
    pub kink_bps: u64,
}

/// Event emitted when the pool's reserve factor changes.
#[odra::event]
pub struct ReserveFactorUpdated {
    /// Previous factor in bps
    pub old_factor_bps: u64,
    /// New factor in bps
    pub new_factor_bps: u64,
}

/// Event emitted when a liquidator capability is granted or revoked.
#[odra::event]
pub struct LiquidatorSet {
    /// Account whose capability changed
    pub account: Address,
    /// Whether the account may now liquidate
    pub enabled: bool,
}

// ============================================================================
// Oracle Events
// ============================================================================

/// Event emitted when a price is pushed.
#[odra::event]
pub struct PriceUpdated {
    /// Priced asset
    pub asset: Address,
    /// New price, 8 fractional digits
    pub price: U256,
    /// Observation timestamp
    pub timestamp: u64,
}

// ============================================================================
// Reserve Events
// ============================================================================

/// Event emitted when a reserve index accrues interest.
#[odra::event]
pub struct ReserveAccrued {
    /// Asset whose index moved
    pub asset: Address,
    /// Borrow rate applied over the elapsed interval, in bps
    pub rate_bps: u64,
    /// Index after accrual, 1e18 scale
    pub index: U256,
    /// Timestamp of accrual
    pub timestamp: u64,
}

// ============================================================================
// Supplier Events
// ============================================================================

/// Event emitted when a supplier deposits into the pool.
#[odra::event]
pub struct Deposited {
    /// Depositor
    pub account: Address,
    /// Deposited asset
    pub asset: Address,
    /// Amount in base units
    pub amount: U256,
    /// Timestamp of deposit
    pub timestamp: u64,
}

/// Event emitted when a supplier withdraws from the pool.
#[odra::event]
pub struct Withdrawn {
    /// Withdrawing account
    pub account: Address,
    /// Withdrawn asset
    pub asset: Address,
    /// Amount in base units
    pub amount: U256,
    /// Timestamp of withdrawal
    pub timestamp: u64,
}

// ============================================================================
// Position Events
// ============================================================================

/// Event emitted when a standalone collateral position is opened.
#[odra::event]
pub struct CollateralDeposited {
    /// New position id
    pub position_id: u64,
    /// Depositing borrower
    pub borrower: Address,
    /// Escrowed asset
    pub asset: Address,
    /// Escrowed amount
    pub amount: U256,
    /// Timestamp of deposit
    pub timestamp: u64,
}

/// Event emitted when collateral leaves a position.
#[odra::event]
pub struct CollateralWithdrawn {
    /// Position the collateral left
    pub position_id: u64,
    /// Amount released back to the borrower
    pub amount: U256,
    /// Timestamp of withdrawal
    pub timestamp: u64,
}

/// Event emitted when a collateralized loan is opened.
#[odra::event]
pub struct Borrowed {
    /// New position id
    pub position_id: u64,
    /// Borrower
    pub borrower: Address,
    /// Borrowed asset
    pub debt_asset: Address,
    /// Borrowed principal
    pub principal: U256,
    /// Escrowed collateral asset
    pub collateral_asset: Address,
    /// Escrowed collateral amount
    pub collateral_amount: U256,
    /// Requested term in seconds
    pub duration_seconds: u64,
    /// Timestamp the loan opened
    pub timestamp: u64,
}

/// Event emitted when a loan is repaid in full.
#[odra::event]
pub struct Repaid {
    /// Closed position id
    pub position_id: u64,
    /// Total collected, principal plus interest
    pub amount: U256,
    /// Interest portion of the collection
    pub interest: U256,
    /// Timestamp of repayment
    pub timestamp: u64,
}

/// Event emitted when an under-collateralized position is closed.
#[odra::event]
pub struct PositionLiquidated {
    /// Closed position id
    pub position_id: u64,
    /// Account that performed the liquidation
    pub liquidator: Address,
    /// Debt collected from the liquidator
    pub debt_covered: U256,
    /// Collateral paid out to the liquidator
    pub collateral_seized: U256,
    /// Collateral returned to the borrower
    pub collateral_refunded: U256,
    /// Timestamp of liquidation
    pub timestamp: u64,
}

// ============================================================================
// Flash Loan Events
// ============================================================================

/// Event emitted when a flash loan completes successfully.
#[odra::event]
pub struct FlashLoanExecuted {
    /// Receiver contract that took the funds
    pub receiver: Address,
    /// Borrowed asset
    pub asset: Address,
    /// Borrowed amount
    pub amount: U256,
    /// Fee retained by the pool
    pub fee: U256,
    /// Timestamp of execution
    pub timestamp: u64,
}

// ============================================================================
// Token Events (mock CEP-18)
// ============================================================================

/// CEP-18 transfer event.
#[odra::event]
pub struct Transfer {
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Amount moved
    pub value: U256,
}

/// CEP-18 approval event.
#[odra::event]
pub struct Approval {
    /// Balance owner
    pub owner: Address,
    /// Approved spender
    pub spender: Address,
    /// Approved amount
    pub value: U256,
}
