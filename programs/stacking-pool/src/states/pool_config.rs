use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::pox::{CycleSchedule, PoxAddress};
use crate::MAX_REWARD_ADMINS;

//
// ──────────────────────────────────────────────────────────────────────────────
// PoolConfig Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Stores all pool-wide configuration and the base-protocol cycle geometry.
///
/// This account is created once at initialization (`initialize_pool`) and is
/// referenced by nearly all instructions. It holds both **static values**
/// (operator, cycle geometry) and **tunable parameters** (buffer, reward
/// address, admin set, active flag).
#[account]
#[derive(Default, Debug)]
pub struct PoolConfig {
    /// PDA bump for this account (for seed derivation).
    pub bump: u8,

    /// Pool operator principal; self-service locks and payouts are keyed
    /// against it.
    pub operator: Pubkey,

    /// Reward address the pool stacks toward when the delegation does not
    /// pin one.
    pub pool_pox_address: PoxAddress,

    /// Global switch: if `false`, new delegations and locks are rejected.
    pub active: bool,

    /// Non-stackable reserve subtracted from every computed lock amount.
    pub stx_buffer_ustx: u128,

    /// Lock length in reward cycles (1 in the common case).
    pub lock_period: u64,

    /// Burn blocks per reward cycle.
    pub reward_cycle_length: u64,

    /// Burn blocks of the prepare phase.
    pub prepare_cycle_length: u64,

    /// Burn height at which cycle 0 started.
    pub first_burn_height: u64,

    /// Minimum partial-stacked amount an aggregation commit must reach.
    pub stacking_threshold_ustx: u128,

    /// Principals allowed to deposit rewards and tune the pool. Never empty.
    pub reward_admins: Vec<Pubkey>,

    /// Monotonic sequence for reward deposits.
    pub deposit_count: u64,
}

impl PoolConfig {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32: operator pubkey
    /// - PoxAddress::MAX_LEN: pool reward address
    /// - 1: active flag
    /// - 16 * 2: two `u128` fields
    /// - 8 * 4: four `u64` fields
    /// - 4 + 32 * MAX_REWARD_ADMINS: admin vec
    /// - 8: deposit sequence
    pub const LEN: usize =
        8 + 1 + 32 + PoxAddress::MAX_LEN + 1 + 16 * 2 + 8 * 4 + 4 + 32 * MAX_REWARD_ADMINS + 8;

    pub fn schedule(&self) -> CycleSchedule {
        CycleSchedule::new(self.first_burn_height, self.reward_cycle_length)
    }

    pub fn half_cycle_length(&self) -> u64 {
        self.reward_cycle_length / 2
    }

    pub fn is_reward_admin(&self, key: &Pubkey) -> bool {
        self.reward_admins.contains(key)
    }

    pub fn assert_reward_admin(&self, key: &Pubkey) -> Result<()> {
        require!(self.is_reward_admin(key), ErrorCode::Unauthorized);
        Ok(())
    }

    /// Add or remove `admin`. Removing the last remaining admin is rejected
    /// so the pool can never lock itself out.
    pub fn update_reward_admin(&mut self, admin: Pubkey, enable: bool) -> Result<()> {
        if enable {
            if !self.reward_admins.contains(&admin) {
                require!(
                    self.reward_admins.len() < MAX_REWARD_ADMINS,
                    ErrorCode::Forbidden
                );
                self.reward_admins.push(admin);
            }
        } else if self.reward_admins.contains(&admin) {
            require!(self.reward_admins.len() > 1, ErrorCode::Forbidden);
            self.reward_admins.retain(|a| a != &admin);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_admins(admins: &[Pubkey]) -> PoolConfig {
        PoolConfig {
            reward_admins: admins.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn there_is_always_an_admin() {
        let first = Pubkey::new_from_array([1u8; 32]);
        let second = Pubkey::new_from_array([2u8; 32]);
        let mut config = config_with_admins(&[first]);

        let result = config.update_reward_admin(first, false);
        assert_eq!(result.unwrap_err(), ErrorCode::Forbidden.into());

        config.update_reward_admin(second, true).unwrap();
        config.update_reward_admin(first, false).unwrap();
        assert_eq!(config.reward_admins, vec![second]);

        let result = config.update_reward_admin(second, false);
        assert_eq!(result.unwrap_err(), ErrorCode::Forbidden.into());
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let admin = Pubkey::new_from_array([1u8; 32]);
        let mut config = config_with_admins(&[admin]);
        config.update_reward_admin(admin, true).unwrap();
        assert_eq!(config.reward_admins.len(), 1);
    }

    #[test]
    fn admin_set_is_capped() {
        let admins: Vec<Pubkey> = (0..MAX_REWARD_ADMINS as u8)
            .map(|i| Pubkey::new_from_array([i + 1; 32]))
            .collect();
        let mut config = config_with_admins(&admins);
        let extra = Pubkey::new_from_array([99u8; 32]);
        let result = config.update_reward_admin(extra, true);
        assert_eq!(result.unwrap_err(), ErrorCode::Forbidden.into());
    }
}
