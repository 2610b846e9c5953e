use anchor_lang::prelude::*;

use crate::MAX_POOL_MEMBERS;

//
// ──────────────────────────────────────────────────────────────────────────────
// Status List Accounts
// ──────────────────────────────────────────────────────────────────────────────
//

/// One recorded lock event: the user and the cycle in which the user
/// delegated. Also the element type returned by `get_status_list`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusEntry {
    pub user: Pubkey,
    pub cycle: u64,
}

impl StatusEntry {
    pub const LEN: usize = 32 + 8;
}

/// Append counter per (pool, cycle), derived from
/// `STATUS_META_SEED + pool + cycle`.
#[account]
#[derive(Default, Debug)]
pub struct StatusListMeta {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool operator the log belongs to.
    pub pool: Pubkey,

    /// The reward cycle the log covers.
    pub cycle: u64,

    /// Number of list entries appended so far.
    pub entries: u64,
}

impl StatusListMeta {
    /// 8 discriminator + 1 bump + 32 pool + 8 * 2.
    pub const LEN: usize = 8 + 1 + 32 + 8 * 2;

    /// Index reported by `get_status_lists_last_index`; 0 while empty, in
    /// keeping with the engine's default-to-zero map reads.
    pub fn last_index(&self) -> u64 {
        self.entries.saturating_sub(1)
    }
}

/// One page of the append-only lock-event log, derived from
/// `STATUS_LIST_SEED + pool + cycle + index`. A page holds at most one
/// batch's worth of members.
#[account]
#[derive(Default, Debug)]
pub struct StatusListEntry {
    /// PDA bump for this account.
    pub bump: u8,

    /// Pool operator the log belongs to.
    pub pool: Pubkey,

    /// The reward cycle the log covers.
    pub cycle: u64,

    /// Page index within the log.
    pub index: u64,

    /// Lock events recorded by the batch that created this page.
    pub members: Vec<StatusEntry>,
}

impl StatusListEntry {
    /// 8 discriminator + 1 bump + 32 pool + 8 * 2 + member vec.
    pub const LEN: usize = 8 + 1 + 32 + 8 * 2 + 4 + StatusEntry::LEN * MAX_POOL_MEMBERS;
}
