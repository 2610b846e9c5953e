use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// RewardDeposit Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Reward pool for one closed cycle, derived from
/// `REWARD_DEPOSIT_SEED + cycle`. Only reward admins may deposit;
/// distribution draws `remaining_ustx` down.
#[account]
#[derive(Default, Debug)]
pub struct RewardDeposit {
    /// PDA bump for this account.
    pub bump: u8,

    /// The cycle the rewards pay for.
    pub cycle: u64,

    /// Sum of all deposits for the cycle, in µSTX.
    pub total_deposited_ustx: u128,

    /// Undistributed balance, in µSTX.
    pub remaining_ustx: u128,

    /// Admin who made the most recent deposit.
    pub depositor: Pubkey,
}

impl RewardDeposit {
    /// 8 discriminator + 1 bump + 8 cycle + 16 * 2 amounts + 32 depositor.
    pub const LEN: usize = 8 + 1 + 8 + 16 * 2 + 32;
}
