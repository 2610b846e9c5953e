use anchor_lang::prelude::*;

use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// Reward Set Accounts
// ──────────────────────────────────────────────────────────────────────────────
//

/// Per-cycle index allocator, derived from `REWARD_CYCLE_META_SEED + cycle`.
/// Indexes are handed out sequentially starting at 0.
#[account]
#[derive(Default, Debug)]
pub struct RewardCycleMeta {
    /// PDA bump for this account.
    pub bump: u8,

    /// The reward cycle this allocator serves.
    pub cycle: u64,

    /// Next index to assign.
    pub next_index: u64,
}

impl RewardCycleMeta {
    /// 8 discriminator + 1 bump + 8 * 2.
    pub const LEN: usize = 8 + 1 + 8 * 2;
}

/// Stable (cycle, reward address) → index mapping, derived from
/// `REWARD_ADDR_INDEX_SEED + cycle + addr_hash`. A re-commit for the same
/// address within the same cycle resolves to the same index.
#[account]
#[derive(Default, Debug)]
pub struct RewardAddressIndex {
    /// PDA bump for this account.
    pub bump: u8,

    /// The reward cycle of the mapping.
    pub cycle: u64,

    /// Assigned reward-set index.
    pub index: u64,

    /// The mapped reward address.
    pub pox_address: PoxAddress,
}

impl RewardAddressIndex {
    /// 8 discriminator + 1 bump + 8 * 2 + reward address.
    pub const LEN: usize = 8 + 1 + 8 * 2 + PoxAddress::MAX_LEN;
}

/// Finalized aggregate produced by a successful commit, derived from
/// `REWARD_SET_SEED + cycle + index`.
#[account]
#[derive(Default, Debug)]
pub struct RewardSetEntry {
    /// PDA bump for this account.
    pub bump: u8,

    /// The reward cycle of the aggregate.
    pub cycle: u64,

    /// Slot in the cycle's reward set.
    pub index: u64,

    /// Reward address the aggregate pays to.
    pub pox_address: PoxAddress,

    /// Total committed µSTX across all contributing pools.
    pub total_ustx: u128,
}

impl RewardSetEntry {
    /// 8 discriminator + 1 bump + 8 * 2 + reward address + 16 total.
    pub const LEN: usize = 8 + 1 + 8 * 2 + PoxAddress::MAX_LEN + 16;
}

/// Replay guard for signer authorizations, derived from
/// `USED_AUTH_SEED + digest`. Each signed (topic, cycle, period, amount,
/// address, auth-id) tuple may authorize exactly one action.
#[account]
#[derive(Default, Debug)]
pub struct UsedSignerAuthorization {
    /// PDA bump for this account.
    pub bump: u8,

    /// Whether the authorization has been consumed.
    pub used: bool,
}

impl UsedSignerAuthorization {
    /// 8 discriminator + 1 bump + 1 flag.
    pub const LEN: usize = 8 + 1 + 1;
}
