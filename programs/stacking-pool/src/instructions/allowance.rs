use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{load_entry_at, load_or_create_entry, store_entry};
use crate::ALLOWANCE_SEED;

/// Accounts context for `allow_contract_caller`.
#[derive(Accounts)]
pub struct AllowContractCaller<'info> {
    /// User granting the allowance; pays for the record on first use.
    #[account(mut)]
    pub user: Signer<'info>,

    /// Allowance record for (user, contract).
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub allowance: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Grant `contract` the right to operate on the user's delegation state,
/// optionally until `until_burn_height`. Re-granting overwrites the expiry.
pub fn allow_contract_caller(
    ctx: Context<AllowContractCaller>,
    contract: Pubkey,
    until_burn_height: Option<u64>,
) -> Result<bool> {
    let user = ctx.accounts.user.key();
    let seeds: &[&[u8]] = &[
        ALLOWANCE_SEED.as_bytes(),
        user.as_ref(),
        contract.as_ref(),
    ];
    let (mut allowance, bump): (CallerAllowance, u8) = load_or_create_entry(
        &ctx.accounts.allowance,
        &ctx.accounts.user.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        seeds,
        CallerAllowance::LEN,
    )?;
    allowance.bump = bump;
    allowance.user = user;
    allowance.contract = contract;
    allowance.until_burn_height = until_burn_height;
    store_entry(&ctx.accounts.allowance, &allowance)?;

    emit!(ContractCallerAllowed {
        user,
        contract,
        until_burn_height,
    });
    Ok(true)
}

/// Accounts context for `revoke_contract_caller`.
#[derive(Accounts)]
pub struct RevokeContractCaller<'info> {
    pub user: Signer<'info>,

    /// Allowance record for (user, contract).
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub allowance: UncheckedAccount<'info>,
}

/// Revoke a previously granted allowance. Returns `false` when none existed.
pub fn revoke_contract_caller(
    ctx: Context<RevokeContractCaller>,
    contract: Pubkey,
) -> Result<bool> {
    let user = ctx.accounts.user.key();
    let seeds: &[&[u8]] = &[
        ALLOWANCE_SEED.as_bytes(),
        user.as_ref(),
        contract.as_ref(),
    ];
    let Some(mut allowance) =
        load_entry_at::<CallerAllowance>(&ctx.accounts.allowance, seeds)?
    else {
        return Ok(false);
    };

    // The record stays allocated; an expiry in the past disables it.
    allowance.until_burn_height = Some(0);
    store_entry(&ctx.accounts.allowance, &allowance)?;

    emit!(ContractCallerRevoked { user, contract });
    Ok(true)
}

/// Shared guard: the user must have granted this engine's own principal a
/// still-valid contract-call allowance.
pub(crate) fn require_engine_allowance(
    allowance_info: &AccountInfo,
    user: &Pubkey,
    burn_height: u64,
) -> Result<()> {
    let engine = crate::ID;
    let seeds: &[&[u8]] = &[
        ALLOWANCE_SEED.as_bytes(),
        user.as_ref(),
        engine.as_ref(),
    ];
    let allowance = load_entry_at::<CallerAllowance>(allowance_info, seeds)?
        .ok_or(ErrorCode::PermissionDenied)?;
    require!(
        allowance.is_valid_at(burn_height),
        ErrorCode::PermissionDenied
    );
    Ok(())
}
