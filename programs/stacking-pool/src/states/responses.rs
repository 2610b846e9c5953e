use anchor_lang::prelude::*;

use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// Typed return values of the query/command surface
// ──────────────────────────────────────────────────────────────────────────────
//

/// Result of a successful lock, mirroring the base protocol's
/// `{lock-amount, stacker, unlock-burn-height}` tuple.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct LockReceipt {
    pub lock_amount_ustx: u128,
    pub stacker: Pubkey,
    pub unlock_burn_height: u64,
}

/// Per-member outcome of a batch lock. Failures carry the error code so one
/// member's failure never aborts the batch.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    Locked(LockReceipt),
    Failed(u32),
}

/// Prior delegation data returned by `revoke_delegate_stx`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DelegationData {
    pub amount_ustx: u128,
    pub delegated_to: Pubkey,
    pub until_burn_height: Option<u64>,
    pub pool_pox_address: Option<PoxAddress>,
}

/// Lock-side slice of a status response.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StackerInfo {
    pub first_reward_cycle: u64,
}

/// Delegation-side slice of a status response.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub pox_address: PoxAddress,
    pub cycle: u64,
    pub amount_ustx: u128,
}

/// Combined projection returned by `get_status`. `total_ustx` is scoped to
/// the pool passed by the caller and reads 0 for any other pool even though
/// the user's own lock info is still visible.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub stacker_info: StackerInfo,
    pub user_info: UserInfo,
    pub total_ustx: u128,
}

/// Reward address and delegation cycle returned by `get_user_data`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserData {
    pub pox_address: PoxAddress,
    pub cycle: u64,
}

/// Cycle geometry snapshot returned by `get_pox_info`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoxInfoResponse {
    pub reward_cycle_id: u64,
    pub reward_cycle_length: u64,
    pub prepare_cycle_length: u64,
    pub half_cycle_length: u64,
    pub first_burn_height: u64,
}
