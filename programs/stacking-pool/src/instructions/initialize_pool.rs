use anchor_lang::prelude::*;
use std::ops::DerefMut;

use crate::pox::PoxAddress;
use crate::states::*;
use crate::{
    DEFAULT_PREPARE_CYCLE_LENGTH, DEFAULT_REWARD_CYCLE_LENGTH, POOL_CONFIG_SEED,
};

/// Accounts context for `initialize_pool`.
///
/// Creates the pool configuration once. The payer becomes the pool operator
/// and the first reward admin.
#[derive(Accounts)]
pub struct InitializePool<'info> {
    /// Pool operator funding the initialization.
    #[account(mut)]
    pub operator: Signer<'info>,

    /// Pool configuration account holding all tunable parameters.
    #[account(
        init,
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump,
        payer = operator,
        space = PoolConfig::LEN
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Writes the pool configuration and the base-protocol cycle geometry.
///
/// # Parameters
/// - `pool_pox_address`: reward address used by self-service locks.
/// - `stx_buffer_ustx`: non-stackable reserve per lock (1 STX observed).
/// - `stacking_threshold_ustx`: minimum partial stack for a commit.
/// - `lock_period`: lock length in cycles, 1 in the common case.
pub fn initialize_pool(
    ctx: Context<InitializePool>,
    pool_pox_address: PoxAddress,
    stx_buffer_ustx: u128,
    stacking_threshold_ustx: u128,
    lock_period: u64,
) -> Result<()> {
    pool_pox_address.validate()?;

    let config = ctx.accounts.pool_config.deref_mut();
    config.bump = ctx.bumps.pool_config;
    config.operator = ctx.accounts.operator.key();
    config.pool_pox_address = pool_pox_address.clone();
    config.active = true;
    config.stx_buffer_ustx = stx_buffer_ustx;
    config.lock_period = lock_period.max(1);
    config.reward_cycle_length = DEFAULT_REWARD_CYCLE_LENGTH;
    config.prepare_cycle_length = DEFAULT_PREPARE_CYCLE_LENGTH;
    config.first_burn_height = 0;
    config.stacking_threshold_ustx = stacking_threshold_ustx;
    config.reward_admins = vec![ctx.accounts.operator.key()];
    config.deposit_count = 0;
    msg!("Pool config initialized");

    emit!(PoolInitialized {
        operator: config.operator,
        reward_admin: config.operator,
        pool_pox_address,
        stx_buffer_ustx,
        stacking_threshold_ustx,
        lock_period: config.lock_period,
    });
    Ok(())
}
