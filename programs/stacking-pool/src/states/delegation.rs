use anchor_lang::prelude::*;

use crate::pox::locking::DelegationSnapshot;
use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// CallerAllowance Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive allowance accounts; see
/// [`crate::ALLOWANCE_SEED`].
///
/// One account per (user, contract) pair, created by
/// `allow_contract_caller`. Delegating through the engine requires an
/// allowance for the engine's own program id.
#[account]
#[derive(Default, Debug)]
pub struct CallerAllowance {
    /// PDA bump for this account.
    pub bump: u8,

    /// User granting the allowance.
    pub user: Pubkey,

    /// Contract principal being allowed.
    pub contract: Pubkey,

    /// Optional expiry; the allowance is invalid past this burn height.
    pub until_burn_height: Option<u64>,
}

impl CallerAllowance {
    /// 8 discriminator + 1 bump + 32 * 2 pubkeys + 9 optional height.
    pub const LEN: usize = 8 + 1 + 32 * 2 + 9;

    pub fn is_valid_at(&self, burn_height: u64) -> bool {
        self.until_burn_height
            .map_or(true, |until| burn_height <= until)
    }
}

//
// ──────────────────────────────────────────────────────────────────────────────
// DelegationRecord Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Per-user delegation intent, derived from `DELEGATION_SEED + user`.
///
/// At most one record exists per user; re-delegating overwrites it. The
/// record stays allocated after a revocation (`active = false`) so user
/// reporting keeps working.
#[account]
#[derive(Default, Debug)]
pub struct DelegationRecord {
    /// PDA bump for this account.
    pub bump: u8,

    /// Owner (user) to whom this record belongs.
    pub user: Pubkey,

    /// Maximum amount the user authorizes for delegation.
    pub amount_ustx: u128,

    /// Pool operator allowed to lock on the user's behalf.
    pub delegated_to: Pubkey,

    /// Optional expiry; the delegation is invalid past this burn height.
    pub until_burn_height: Option<u64>,

    /// Optional pinned payout address; absent means the operator supplies
    /// one per lock.
    pub pool_pox_address: Option<PoxAddress>,

    /// The user's own reward address, surfaced by status reporting.
    pub user_pox_address: PoxAddress,

    /// Reward cycle in which the delegation was recorded.
    pub cycle: u64,

    /// Cleared on revocation; the account itself is kept.
    pub active: bool,
}

impl DelegationRecord {
    /// 8 discriminator + 1 bump + 32 user + 16 amount + 32 delegate +
    /// 9 optional height + (1 + addr) optional pool address + addr user
    /// address + 8 cycle + 1 active.
    pub const LEN: usize =
        8 + 1 + 32 + 16 + 32 + 9 + 1 + PoxAddress::MAX_LEN + PoxAddress::MAX_LEN + 8 + 1;

    pub fn snapshot(&self) -> DelegationSnapshot {
        DelegationSnapshot {
            amount_ustx: self.amount_ustx,
            delegated_to: self.delegated_to,
            until_burn_height: self.until_burn_height,
            active: self.active,
        }
    }
}
