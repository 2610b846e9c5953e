use anchor_lang::prelude::*;

use crate::MAX_POOL_MEMBERS;

//
// ──────────────────────────────────────────────────────────────────────────────
// AutoExtendRegistry Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// The user set the auto-extend job iterates, derived from
/// `AUTO_EXTEND_SEED`. Admin-managed; replaced wholesale by
/// `set_auto_extend_users`.
#[account]
#[derive(Default, Debug)]
pub struct AutoExtendRegistry {
    /// PDA bump for this account.
    pub bump: u8,

    /// Users to re-lock once per cycle.
    pub users: Vec<Pubkey>,
}

impl AutoExtendRegistry {
    /// 8 discriminator + 1 bump + user vec.
    pub const LEN: usize = 8 + 1 + 4 + 32 * MAX_POOL_MEMBERS;
}
