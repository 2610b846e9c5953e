use anchor_lang::prelude::*;

use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// PartialStackEntry Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Pre-commit running total for one (pool, reward address, cycle) triple,
/// derived from `PARTIAL_STACK_SEED + pool + addr_hash + cycle`.
///
/// `stacked_ustx` only grows while the cycle is open. Commits and increases
/// never subtract from it; they advance `committed_ustx` instead, so the
/// next increase picks up exactly the stake accumulated since.
#[account]
#[derive(Default, Debug)]
pub struct PartialStackEntry {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool operator the stake was routed through.
    pub pool: Pubkey,

    /// Reward address the stake is destined for.
    pub pox_address: PoxAddress,

    /// The reward cycle this entry belongs to.
    pub cycle: u64,

    /// Total µSTX locked toward the triple so far. Monotone.
    pub stacked_ustx: u128,

    /// Watermark of what commits/increases have already consumed.
    pub committed_ustx: u128,
}

impl PartialStackEntry {
    /// 8 discriminator + 1 bump + 32 pool + reward address + 8 cycle +
    /// 16 * 2 amounts.
    pub const LEN: usize = 8 + 1 + 32 + PoxAddress::MAX_LEN + 8 + 16 * 2;

    /// Stake accumulated since the last commit or increase.
    pub fn uncommitted_ustx(&self) -> u128 {
        self.stacked_ustx.saturating_sub(self.committed_ustx)
    }
}

//
// ──────────────────────────────────────────────────────────────────────────────
// PoolCycleTotal Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Pool-scoped locked total for one cycle, derived from
/// `POOL_CYCLE_TOTAL_SEED + pool + cycle`. This is the `total` surfaced by
/// status reporting and the denominator of reward distribution.
#[account]
#[derive(Default, Debug)]
pub struct PoolCycleTotal {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool operator the total belongs to.
    pub pool: Pubkey,

    /// The reward cycle this total belongs to.
    pub cycle: u64,

    /// Sum of all lock deltas booked for the cycle, in µSTX.
    pub total_ustx: u128,
}

impl PoolCycleTotal {
    /// 8 discriminator + 1 bump + 32 pool + 8 cycle + 16 amount.
    pub const LEN: usize = 8 + 1 + 32 + 8 + 16;
}
