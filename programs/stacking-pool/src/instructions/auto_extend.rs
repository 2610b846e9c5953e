use anchor_lang::prelude::*;
use anchor_lang::solana_program::clock::Clock;

use crate::error::ErrorCode;
use crate::instructions::delegate_stack_stx::{
    append_status_entries, apply_lock, LockEnv, MemberAccounts,
};
use crate::pox::locking::LockAction;
use crate::states::*;
use crate::utils::load_entry_at;
use crate::{
    AUTO_EXTEND_SEED, DELEGATION_SEED, MAX_POOL_MEMBERS, POOL_CONFIG_SEED, USER_LOCK_SEED,
};

/// Accounts context for `set_auto_extend_users`.
#[derive(Accounts)]
pub struct SetAutoExtendUsers<'info> {
    /// Reward admin maintaining the registry; pays on first use.
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Pool configuration (admin check).
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// The registered user set, replaced wholesale.
    #[account(
        init_if_needed,
        seeds = [AUTO_EXTEND_SEED.as_bytes()],
        bump,
        payer = admin,
        space = AutoExtendRegistry::LEN
    )]
    pub registry: Account<'info, AutoExtendRegistry>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Replace the set of users the auto-extend job iterates.
pub fn set_auto_extend_users(ctx: Context<SetAutoExtendUsers>, users: Vec<Pubkey>) -> Result<bool> {
    ctx.accounts
        .pool_config
        .assert_reward_admin(&ctx.accounts.admin.key())?;
    require!(users.len() <= MAX_POOL_MEMBERS, ErrorCode::BatchTooLarge);

    let registry = &mut ctx.accounts.registry;
    registry.bump = ctx.bumps.registry;
    registry.users = users;

    emit!(AutoExtendUsersSet {
        count: registry.users.len() as u64,
    });
    Ok(true)
}

/// Accounts context for `run_auto_extend_job`.
///
/// Remaining accounts carry one `[user, delegation, user_lock,
/// user_cycle_stake]` group per registered user due for extension.
#[derive(Accounts)]
pub struct RunAutoExtendJob<'info> {
    /// Anyone may poll the job; the caller pays for new entries.
    #[account(mut)]
    pub caller: Signer<'info>,

    /// Pool configuration.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// The registered user set.
    ///
    /// CHECK: Derivation is validated in the instruction; the job is a
    /// no-op while the registry does not exist.
    pub registry: UncheckedAccount<'info>,

    /// Partial-stack accumulator for (pool, pool reward address, next cycle).
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub partial_stack: UncheckedAccount<'info>,

    /// Pool-scoped locked total for the next cycle.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub pool_cycle_total: UncheckedAccount<'info>,

    /// Lock-event log counter for (pool, next cycle).
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub status_list_meta: UncheckedAccount<'info>,

    /// Lock-event log page being appended.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub status_list_entry: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Re-lock the registered user set into the next cycle.
///
/// Safe to poll every block: returns `Ok(false)` before the running cycle's
/// halfway point and while the registry is empty, and swallows per-user
/// failures. `Ok(true)` means at least one user was extended.
pub fn run_auto_extend_job<'info>(
    ctx: Context<'_, '_, 'info, 'info, RunAutoExtendJob<'info>>,
) -> Result<bool> {
    let config = &ctx.accounts.pool_config;
    let sched = config.schedule();
    let burn_height = Clock::get()?.slot;

    if !sched.in_extend_window(burn_height) {
        return Ok(false);
    }

    let registry_seeds: &[&[u8]] = &[AUTO_EXTEND_SEED.as_bytes()];
    let Some(registry) =
        load_entry_at::<AutoExtendRegistry>(&ctx.accounts.registry, registry_seeds)?
    else {
        return Ok(false);
    };
    if registry.users.is_empty() {
        return Ok(false);
    }

    let current_cycle = sched.cycle_of(burn_height);
    let next_cycle_start = sched.start_of(current_cycle + 1);
    let env = LockEnv {
        config,
        pool: config.operator,
        pox_address: &config.pool_pox_address,
        payer: ctx.accounts.caller.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
        partial_stack: &ctx.accounts.partial_stack,
        pool_cycle_total: &ctx.accounts.pool_cycle_total,
        burn_height,
        start_burn_height: burn_height,
    };

    let mut extended: u64 = 0;
    let mut status_entries = Vec::new();
    for group in ctx.remaining_accounts.chunks_exact(4) {
        let user = &group[0];
        if !registry.users.contains(user.key) {
            continue;
        }

        // Only positions that expire at the next cycle boundary are due.
        let lock_seeds: &[&[u8]] = &[USER_LOCK_SEED.as_bytes(), user.key.as_ref()];
        let Ok(Some(lock)) = load_entry_at::<UserLockState>(&group[2], lock_seeds) else {
            continue;
        };
        if lock.unlock_burn_height <= burn_height || lock.unlock_burn_height > next_cycle_start {
            continue;
        }

        let delegation_seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.key.as_ref()];
        let Ok(Some(delegation)) = load_entry_at::<DelegationRecord>(&group[1], delegation_seeds)
        else {
            continue;
        };

        let member = MemberAccounts {
            user,
            delegation: &group[1],
            user_lock: &group[2],
            user_cycle_stake: &group[3],
        };
        match apply_lock(&env, &member, delegation.amount_ustx) {
            Ok(applied) if applied.plan.action == LockAction::Extend => {
                status_entries.push(applied.status_entry);
                extended += 1;
            }
            Ok(_) => {}
            Err(_) => {}
        }
    }

    if !status_entries.is_empty() {
        append_status_entries(
            &ctx.accounts.status_list_meta,
            &ctx.accounts.status_list_entry,
            &env.payer,
            &env.system_program,
            env.pool,
            current_cycle + 1,
            status_entries,
        )?;
    }

    emit!(AutoExtendRan {
        cycle: current_cycle,
        extended,
    });
    Ok(extended > 0)
}
