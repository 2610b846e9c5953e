use anchor_lang::prelude::*;

use crate::pox::locking::LockSnapshot;
use crate::pox::PoxAddress;

//
// ──────────────────────────────────────────────────────────────────────────────
// UserLockState Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// The user's single lock position, derived from `USER_LOCK_SEED + user`.
///
/// A new lock replaces the prior one only once the prior has unlocked;
/// extensions mutate the unlock height in place.
#[account]
#[derive(Default, Debug)]
pub struct UserLockState {
    /// PDA bump for this account.
    pub bump: u8,

    /// Owner (user) to whom this position belongs.
    pub user: Pubkey,

    /// Amount currently locked, in µSTX.
    pub locked_amount: u128,

    /// Burn height at which the position unlocks.
    pub unlock_burn_height: u64,

    /// First reward cycle the position is active in.
    pub first_reward_cycle: u64,

    /// Reward address the position stacks toward.
    pub pox_address: PoxAddress,
}

impl UserLockState {
    /// 8 discriminator + 1 bump + 32 user + 16 amount + 8 * 2 heights/cycles
    /// + reward address.
    pub const LEN: usize = 8 + 1 + 32 + 16 + 8 * 2 + PoxAddress::MAX_LEN;

    pub fn snapshot(&self) -> LockSnapshot {
        LockSnapshot {
            locked_amount: self.locked_amount,
            unlock_burn_height: self.unlock_burn_height,
            first_reward_cycle: self.first_reward_cycle,
        }
    }
}

//
// ──────────────────────────────────────────────────────────────────────────────
// UserCycleStake Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Finalized per-user amount for one cycle, derived from
/// `USER_CYCLE_STAKE_SEED + user + cycle`.
///
/// Written by every lock event targeting the cycle and consumed by the
/// payout engine; `rewards_paid` makes distribution idempotent.
#[account]
#[derive(Default, Debug)]
pub struct UserCycleStake {
    /// PDA bump for this account.
    pub bump: u8,

    /// Owner (user) of the position.
    pub user: Pubkey,

    /// Pool that locked for the cycle.
    pub pool: Pubkey,

    /// The reward cycle this row belongs to.
    pub cycle: u64,

    /// Amount locked for the cycle, in µSTX.
    pub amount_ustx: u128,

    /// Set once the user's share for this cycle has been distributed.
    pub rewards_paid: bool,
}

impl UserCycleStake {
    /// 8 discriminator + 1 bump + 32 * 2 pubkeys + 8 cycle + 16 amount +
    /// 1 paid flag.
    pub const LEN: usize = 8 + 1 + 32 * 2 + 8 + 16 + 1;
}
