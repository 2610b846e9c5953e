use anchor_lang::prelude::*;

use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track pool state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the pool configuration is initialized.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolInitialized {
    /// Pool operator principal.
    pub operator: Pubkey,
    /// Initial reward admin.
    pub reward_admin: Pubkey,
    /// Pool-wide reward address.
    pub pool_pox_address: PoxAddress,
    /// Non-stackable reserve, in µSTX.
    pub stx_buffer_ustx: u128,
    /// Minimum partial stack an aggregation commit must reach.
    pub stacking_threshold_ustx: u128,
    /// Lock length in reward cycles.
    pub lock_period: u64,
}

/// Emitted when a user grants a contract-call allowance.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ContractCallerAllowed {
    pub user: Pubkey,
    pub contract: Pubkey,
    pub until_burn_height: Option<u64>,
}

/// Emitted when a user revokes a contract-call allowance.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ContractCallerRevoked {
    pub user: Pubkey,
    pub contract: Pubkey,
}

/// Emitted whenever a delegation record is written (including overwrites).
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StxDelegated {
    pub user: Pubkey,
    pub delegated_to: Pubkey,
    pub amount_ustx: u128,
    pub until_burn_height: Option<u64>,
}

/// Emitted when a delegation is revoked.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct DelegationRevoked {
    pub user: Pubkey,
    pub amount_ustx: u128,
}

/// Emitted for every successful lock event: fresh locks, top-ups and
/// extensions alike. `delta_ustx` is what the cycle accumulators gained.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StxLocked {
    pub user: Pubkey,
    pub pool: Pubkey,
    pub lock_amount_ustx: u128,
    pub delta_ustx: u128,
    pub unlock_burn_height: u64,
    pub cycle: u64,
}

/// Emitted after a successful aggregation commit.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct AggregationCommitted {
    pub pool: Pubkey,
    pub cycle: u64,
    pub reward_set_index: u64,
    pub amount_ustx: u128,
}

/// Emitted after a successful aggregation increase.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct AggregationIncreased {
    pub pool: Pubkey,
    pub cycle: u64,
    pub reward_set_index: u64,
    pub amount_ustx: u128,
}

/// Emitted when the auto-extend user set is replaced.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct AutoExtendUsersSet {
    pub count: u64,
}

/// Emitted after each auto-extend run that got past its gates.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct AutoExtendRan {
    pub cycle: u64,
    pub extended: u64,
}

/// Emitted on every reward deposit.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsDeposited {
    pub cycle: u64,
    pub amount_ustx: u128,
    pub sequence: u64,
    pub depositor: Pubkey,
}

/// Emitted after a distribution batch.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsDistributed {
    pub cycle: u64,
    pub users_paid: u64,
    pub total_paid_ustx: u128,
}

/// Emitted when the reward admin set changes.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardAdminUpdated {
    pub admin: Pubkey,
    pub enabled: bool,
}

/// Emitted whenever tunable pool parameters change.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolConfigUpdated {
    pub active: bool,
    pub stx_buffer_ustx: u128,
    pub pool_pox_address: PoxAddress,
}
