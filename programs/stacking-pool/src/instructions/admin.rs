use anchor_lang::prelude::*;

use crate::pox::PoxAddress;
use crate::states::*;
use crate::POOL_CONFIG_SEED;

/// Accounts context shared by the admin instructions.
///
/// Every handler requires the signer to be a current reward admin
/// (`Unauthorized` otherwise); `set_reward_admin` additionally enforces
/// that the admin set never empties (`Forbidden`).
#[derive(Accounts)]
pub struct UpdatePoolConfig<'info> {
    /// A current reward admin.
    pub admin: Signer<'info>,

    /// Pool configuration being updated.
    #[account(
        mut,
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,
}

/// Add or remove a reward admin. Removing the last remaining admin fails.
pub fn set_reward_admin(ctx: Context<UpdatePoolConfig>, admin: Pubkey, enable: bool) -> Result<bool> {
    let config = &mut ctx.accounts.pool_config;
    config.assert_reward_admin(&ctx.accounts.admin.key())?;
    config.update_reward_admin(admin, enable)?;

    emit!(RewardAdminUpdated {
        admin,
        enabled: enable,
    });
    Ok(true)
}

/// Switch the pool on or off. An inactive pool rejects new delegations and
/// locks while existing positions unlock on schedule.
pub fn set_active(ctx: Context<UpdatePoolConfig>, active: bool) -> Result<bool> {
    let config = &mut ctx.accounts.pool_config;
    config.assert_reward_admin(&ctx.accounts.admin.key())?;
    config.active = active;

    emit!(PoolConfigUpdated {
        active: config.active,
        stx_buffer_ustx: config.stx_buffer_ustx,
        pool_pox_address: config.pool_pox_address.clone(),
    });
    Ok(true)
}

/// Tune the non-stackable reserve subtracted from every computed lock.
pub fn set_stx_buffer(ctx: Context<UpdatePoolConfig>, amount_ustx: u128) -> Result<bool> {
    let config = &mut ctx.accounts.pool_config;
    config.assert_reward_admin(&ctx.accounts.admin.key())?;
    config.stx_buffer_ustx = amount_ustx;

    emit!(PoolConfigUpdated {
        active: config.active,
        stx_buffer_ustx: config.stx_buffer_ustx,
        pool_pox_address: config.pool_pox_address.clone(),
    });
    Ok(true)
}

/// Replace the pool-wide reward address used by self-service locks.
pub fn set_pool_pox_address(ctx: Context<UpdatePoolConfig>, pox_address: PoxAddress) -> Result<bool> {
    pox_address.validate()?;
    let config = &mut ctx.accounts.pool_config;
    config.assert_reward_admin(&ctx.accounts.admin.key())?;
    config.pool_pox_address = pox_address;

    emit!(PoolConfigUpdated {
        active: config.active,
        stx_buffer_ustx: config.stx_buffer_ustx,
        pool_pox_address: config.pool_pox_address.clone(),
    });
    Ok(true)
}
