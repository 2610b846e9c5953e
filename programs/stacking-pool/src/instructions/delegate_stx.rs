use anchor_lang::prelude::*;
use anchor_lang::solana_program::clock::Clock;

use crate::error::ErrorCode;
use crate::instructions::allowance::require_engine_allowance;
use crate::pox::PoxAddress;
use crate::states::*;
use crate::utils::{load_entry_at, load_or_create_entry, store_entry};
use crate::{DELEGATION_SEED, POOL_CONFIG_SEED};

/// Accounts context for `delegate_stx`.
///
/// Records the user's delegation intent. No funds move and nothing is
/// locked yet; the pool operator turns intent into locks via
/// `delegate_stack_stx`.
#[derive(Accounts)]
pub struct DelegateStx<'info> {
    /// User delegating; pays for the record on first use.
    #[account(mut)]
    pub user: Signer<'info>,

    /// Pool configuration; delegation requires an active pool.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// The user's allowance for this engine's own principal.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub allowance: UncheckedAccount<'info>,

    /// Delegation record for the user.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub delegation: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Record (or overwrite) the user's delegation.
///
/// # Fails
/// - `PermissionDenied` when the user has not granted the engine a
///   contract-call allowance, or the allowance expired.
/// - `PoolDeactivated` when the pool has been switched off.
/// - `NonPositiveAmount` for a zero amount.
pub fn delegate_stx(
    ctx: Context<DelegateStx>,
    amount_ustx: u128,
    delegate_to: Pubkey,
    until_burn_height: Option<u64>,
    pool_pox_address: Option<PoxAddress>,
    user_pox_address: PoxAddress,
) -> Result<bool> {
    let config = &ctx.accounts.pool_config;
    require!(config.active, ErrorCode::PoolDeactivated);
    require!(amount_ustx > 0, ErrorCode::NonPositiveAmount);
    user_pox_address.validate()?;
    if let Some(addr) = pool_pox_address.as_ref() {
        addr.validate()?;
    }

    let burn_height = Clock::get()?.slot;
    let user = ctx.accounts.user.key();
    require_engine_allowance(&ctx.accounts.allowance, &user, burn_height)?;

    let seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.as_ref()];
    let (mut record, bump): (DelegationRecord, u8) = load_or_create_entry(
        &ctx.accounts.delegation,
        &ctx.accounts.user.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        seeds,
        DelegationRecord::LEN,
    )?;

    // Re-delegating overwrites the prior record, it never accumulates.
    record.bump = bump;
    record.user = user;
    record.amount_ustx = amount_ustx;
    record.delegated_to = delegate_to;
    record.until_burn_height = until_burn_height;
    record.pool_pox_address = pool_pox_address;
    record.user_pox_address = user_pox_address;
    record.cycle = config.schedule().cycle_of(burn_height);
    record.active = true;
    store_entry(&ctx.accounts.delegation, &record)?;

    emit!(StxDelegated {
        user,
        delegated_to: delegate_to,
        amount_ustx,
        until_burn_height,
    });
    Ok(true)
}

/// Accounts context for `revoke_delegate_stx`.
#[derive(Accounts)]
pub struct RevokeDelegateStx<'info> {
    pub user: Signer<'info>,

    /// Delegation record for the user.
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub delegation: UncheckedAccount<'info>,
}

/// Clear the user's delegation and return the prior record, if any.
///
/// The account itself stays allocated so user reporting keeps working; only
/// the active flag is cleared.
pub fn revoke_delegate_stx(ctx: Context<RevokeDelegateStx>) -> Result<Option<DelegationData>> {
    let user = ctx.accounts.user.key();
    let seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.as_ref()];
    let Some(mut record) = load_entry_at::<DelegationRecord>(&ctx.accounts.delegation, seeds)?
    else {
        return Ok(None);
    };
    if !record.active {
        return Ok(None);
    }

    let prior = DelegationData {
        amount_ustx: record.amount_ustx,
        delegated_to: record.delegated_to,
        until_burn_height: record.until_burn_height,
        pool_pox_address: record.pool_pox_address.clone(),
    };

    record.active = false;
    store_entry(&ctx.accounts.delegation, &record)?;

    emit!(DelegationRevoked {
        user,
        amount_ustx: prior.amount_ustx,
    });
    Ok(Some(prior))
}
