use anchor_lang::prelude::*;
use anchor_lang::solana_program::clock::Clock;
use anchor_lang::solana_program::program_error::ProgramError;

use crate::error::ErrorCode;
use crate::pox::locking::{plan_lock, LockAction, LockPlan, LockRequest};
use crate::pox::PoxAddress;
use crate::states::*;
use crate::utils::{load_entry_at, load_or_create_entry, store_entry};
use crate::{
    DELEGATION_SEED, MAX_POOL_MEMBERS, PARTIAL_STACK_SEED, POOL_CONFIG_SEED,
    POOL_CYCLE_TOTAL_SEED, STATUS_LIST_SEED, STATUS_META_SEED, USER_CYCLE_STAKE_SEED,
    USER_LOCK_SEED,
};

/// Catch-all code surfaced through batch results for failures that are not
/// part of the engine's error taxonomy.
pub const ERR_UNEXPECTED: u32 = 999;

/// Shared, per-call lock environment: the pool, the reward address the
/// batch stacks toward and the cycle accumulators receiving the deltas.
pub(crate) struct LockEnv<'a, 'info> {
    pub config: &'a PoolConfig,
    pub pool: Pubkey,
    pub pox_address: &'a PoxAddress,
    pub payer: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub partial_stack: &'a AccountInfo<'info>,
    pub pool_cycle_total: &'a AccountInfo<'info>,
    pub burn_height: u64,
    pub start_burn_height: u64,
}

/// Per-member accounts of one lock decision.
pub(crate) struct MemberAccounts<'a, 'info> {
    pub user: &'a AccountInfo<'info>,
    pub delegation: &'a AccountInfo<'info>,
    pub user_lock: &'a AccountInfo<'info>,
    pub user_cycle_stake: &'a AccountInfo<'info>,
}

/// Result of one applied lock decision.
pub(crate) struct LockApplied {
    pub receipt: LockReceipt,
    pub plan: LockPlan,
    pub status_entry: StatusEntry,
}

/// Run the lock decision tree for one member and apply the resulting plan:
/// update the lock position, book the delta into the partial-stack and
/// pool-total accumulators and write the member's per-cycle stake row.
pub(crate) fn apply_lock<'info>(
    env: &LockEnv<'_, 'info>,
    member: &MemberAccounts<'_, 'info>,
    requested_ustx: u128,
) -> Result<LockApplied> {
    require!(env.config.active, ErrorCode::PoolDeactivated);

    let user = *member.user.key;
    let delegation_seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.as_ref()];
    let delegation = load_entry_at::<DelegationRecord>(member.delegation, delegation_seeds)?;

    // A pinned payout address is authoritative; a mismatching operator
    // supplied address is a permission violation.
    if let Some(record) = delegation.as_ref() {
        if let Some(pinned) = record.pool_pox_address.as_ref() {
            require!(pinned == env.pox_address, ErrorCode::PermissionDenied);
        }
    }

    let lock_seeds: &[&[u8]] = &[USER_LOCK_SEED.as_bytes(), user.as_ref()];
    let existing_lock = load_entry_at::<UserLockState>(member.user_lock, lock_seeds)?;

    let delegation_snapshot = delegation.as_ref().map(|record| record.snapshot());
    let lock_snapshot = existing_lock.as_ref().map(|lock| lock.snapshot());
    let request = LockRequest {
        pool: env.pool,
        delegation: delegation_snapshot.as_ref(),
        current_lock: lock_snapshot.as_ref(),
        requested_ustx,
        available_ustx: member.user.lamports() as u128,
        start_burn_height: env.start_burn_height,
        burn_height: env.burn_height,
    };
    let sched = env.config.schedule();
    let plan = plan_lock(&request, &sched, env.config.stx_buffer_ustx, env.config.lock_period)?;

    // The plan is final; everything below only records it.
    let (mut lock, lock_bump): (UserLockState, u8) = load_or_create_entry(
        member.user_lock,
        &env.payer,
        &env.system_program,
        lock_seeds,
        UserLockState::LEN,
    )?;
    lock.bump = lock_bump;
    lock.user = user;
    lock.locked_amount = plan.lock_amount;
    lock.unlock_burn_height = plan.unlock_burn_height;
    if plan.action == LockAction::Initial {
        lock.first_reward_cycle = plan.target_cycle;
        lock.pox_address = env.pox_address.clone();
    }
    store_entry(member.user_lock, &lock)?;

    let target_le = plan.target_cycle.to_le_bytes();
    if plan.delta_ustx > 0 {
        let addr_hash = env.pox_address.seed_hash();
        let partial_seeds: &[&[u8]] = &[
            PARTIAL_STACK_SEED.as_bytes(),
            env.pool.as_ref(),
            addr_hash.as_ref(),
            &target_le,
        ];
        let (mut partial, partial_bump): (PartialStackEntry, u8) = load_or_create_entry(
            env.partial_stack,
            &env.payer,
            &env.system_program,
            partial_seeds,
            PartialStackEntry::LEN,
        )?;
        partial.bump = partial_bump;
        partial.pool = env.pool;
        partial.cycle = plan.target_cycle;
        if partial.pox_address.hashbytes.is_empty() {
            partial.pox_address = env.pox_address.clone();
        }
        partial.stacked_ustx = partial
            .stacked_ustx
            .checked_add(plan.delta_ustx)
            .ok_or(ErrorCode::Overflow)?;
        store_entry(env.partial_stack, &partial)?;

        let total_seeds: &[&[u8]] = &[
            POOL_CYCLE_TOTAL_SEED.as_bytes(),
            env.pool.as_ref(),
            &target_le,
        ];
        let (mut total, total_bump): (PoolCycleTotal, u8) = load_or_create_entry(
            env.pool_cycle_total,
            &env.payer,
            &env.system_program,
            total_seeds,
            PoolCycleTotal::LEN,
        )?;
        total.bump = total_bump;
        total.pool = env.pool;
        total.cycle = plan.target_cycle;
        total.total_ustx = total
            .total_ustx
            .checked_add(plan.delta_ustx)
            .ok_or(ErrorCode::Overflow)?;
        store_entry(env.pool_cycle_total, &total)?;
    }

    let stake_seeds: &[&[u8]] = &[USER_CYCLE_STAKE_SEED.as_bytes(), user.as_ref(), &target_le];
    let (mut stake, stake_bump): (UserCycleStake, u8) = load_or_create_entry(
        member.user_cycle_stake,
        &env.payer,
        &env.system_program,
        stake_seeds,
        UserCycleStake::LEN,
    )?;
    stake.bump = stake_bump;
    stake.user = user;
    stake.pool = env.pool;
    stake.cycle = plan.target_cycle;
    stake.amount_ustx = plan.lock_amount;
    store_entry(member.user_cycle_stake, &stake)?;

    emit!(StxLocked {
        user,
        pool: env.pool,
        lock_amount_ustx: plan.lock_amount,
        delta_ustx: plan.delta_ustx,
        unlock_burn_height: plan.unlock_burn_height,
        cycle: plan.target_cycle,
    });

    let delegation_cycle = delegation.map(|record| record.cycle).unwrap_or_default();
    Ok(LockApplied {
        receipt: LockReceipt {
            lock_amount_ustx: plan.lock_amount,
            stacker: user,
            unlock_burn_height: plan.unlock_burn_height,
        },
        plan,
        status_entry: StatusEntry {
            user,
            cycle: delegation_cycle,
        },
    })
}

/// Append one page to the (pool, cycle) lock-event log.
pub(crate) fn append_status_entries<'info>(
    meta_info: &AccountInfo<'info>,
    entry_info: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    pool: Pubkey,
    cycle: u64,
    members: Vec<StatusEntry>,
) -> Result<()> {
    if members.is_empty() {
        return Ok(());
    }
    let cycle_le = cycle.to_le_bytes();
    let meta_seeds: &[&[u8]] = &[STATUS_META_SEED.as_bytes(), pool.as_ref(), &cycle_le];
    let (mut meta, meta_bump): (StatusListMeta, u8) = load_or_create_entry(
        meta_info,
        payer,
        system_program,
        meta_seeds,
        StatusListMeta::LEN,
    )?;
    meta.bump = meta_bump;
    meta.pool = pool;
    meta.cycle = cycle;

    let index = meta.entries;
    let index_le = index.to_le_bytes();
    let entry_seeds: &[&[u8]] = &[
        STATUS_LIST_SEED.as_bytes(),
        pool.as_ref(),
        &cycle_le,
        &index_le,
    ];
    let (mut entry, entry_bump): (StatusListEntry, u8) = load_or_create_entry(
        entry_info,
        payer,
        system_program,
        entry_seeds,
        StatusListEntry::LEN,
    )?;
    entry.bump = entry_bump;
    entry.pool = pool;
    entry.cycle = cycle;
    entry.index = index;
    entry.members = members;
    store_entry(entry_info, &entry)?;

    meta.entries = index + 1;
    store_entry(meta_info, &meta)
}

/// Numeric error code carried inside a batch result.
pub(crate) fn outcome_code(err: Error) -> u32 {
    match err {
        Error::AnchorError(e) => e.error_code_number,
        Error::ProgramError(e) => match e.program_error {
            ProgramError::Custom(code) => code,
            _ => ERR_UNEXPECTED,
        },
    }
}

/// Accounts context for `delegate_stack_stx`.
#[derive(Accounts)]
pub struct DelegateStackStx<'info> {
    /// Pool operator locking on the user's behalf; pays for new entries.
    #[account(mut)]
    pub pool_operator: Signer<'info>,

    /// Pool configuration.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// The delegator whose stake is being locked.
    ///
    /// CHECK: Only the lamport balance is read.
    pub user: UncheckedAccount<'info>,

    /// Delegation record of the user.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub delegation: UncheckedAccount<'info>,

    /// Lock position of the user.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub user_lock: UncheckedAccount<'info>,

    /// Per-cycle stake row of the user for the target cycle.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub user_cycle_stake: UncheckedAccount<'info>,

    /// Partial-stack accumulator for (pool, reward address, target cycle).
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub partial_stack: UncheckedAccount<'info>,

    /// Pool-scoped locked total for the target cycle.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub pool_cycle_total: UncheckedAccount<'info>,

    /// Lock-event log counter for (pool, target cycle).
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

/// Lock delegated stake for one user toward `pox_address`.
///
/// Runs the full decision tree: fresh lock, same-cycle top-up (booking only
/// the delta) or extension into the next cycle once the current one passed
/// its halfway point. Returns the `{lock-amount, stacker,
/// unlock-burn-height}` receipt.
pub fn delegate_stack_stx(
    ctx: Context<DelegateStackStx>,
    amount_ustx: u128,
    pox_address: PoxAddress,
    start_burn_height: u64,
) -> Result<LockReceipt> {
    pox_address.validate()?;
    let burn_height = Clock::get()?.slot;
    let env = LockEnv {
        config: &ctx.accounts.pool_config,
        pool: ctx.accounts.pool_operator.key(),
        pox_address: &pox_address,
        payer: ctx.accounts.pool_operator.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
        partial_stack: &ctx.accounts.partial_stack,
        pool_cycle_total: &ctx.accounts.pool_cycle_total,
        burn_height,
        start_burn_height,
    };
    let member = MemberAccounts {
        user: &ctx.accounts.user,
        delegation: &ctx.accounts.delegation,
        user_lock: &ctx.accounts.user_lock,
        user_cycle_stake: &ctx.accounts.user_cycle_stake,
    };

    let applied = apply_lock(&env, &member, amount_ustx)?;

    // Top-ups stay within the already recorded lock op; only materially new
    // lock events land in the status log.
    if applied.plan.action != LockAction::TopUp {
        append_status_entries(
            &ctx.accounts.status_list_meta,
            &ctx.accounts.status_list_entry,
            &env.payer,
            &env.system_program,
            env.pool,
            applied.plan.target_cycle,
            vec![applied.status_entry.clone()],
        )?;
    }
    Ok(applied.receipt)
}

/// Accounts context for `delegate_stack_stx_many`.
///
/// Remaining accounts carry one `[user, delegation, user_lock,
/// user_cycle_stake]` group per member, aligned with `amounts_ustx`.
#[derive(Accounts)]
pub struct DelegateStackStxMany<'info> {
    /// Pool operator locking on the members' behalf; pays for new entries.
    #[account(mut)]
    pub pool_operator: Signer<'info>,

    /// Pool configuration.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Partial-stack accumulator for (pool, reward address, target cycle).
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub partial_stack: UncheckedAccount<'info>,

    /// Pool-scoped locked total for the target cycle.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub pool_cycle_total: UncheckedAccount<'info>,

    /// Lock-event log counter for (pool, target cycle).
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

/// Best-effort batch lock with per-item error isolation: every member is
/// processed independently and failures are returned as values, so one
/// member's failure never aborts the rest.
pub fn delegate_stack_stx_many<'info>(
    ctx: Context<'_, '_, 'info, 'info, DelegateStackStxMany<'info>>,
    amounts_ustx: Vec<u128>,
    pox_address: PoxAddress,
    start_burn_height: u64,
) -> Result<Vec<LockOutcome>> {
    pox_address.validate()?;
    require!(
        amounts_ustx.len() <= MAX_POOL_MEMBERS,
        ErrorCode::BatchTooLarge
    );
    let groups = ctx.remaining_accounts.chunks_exact(4);
    require!(
        groups.len() == amounts_ustx.len(),
        ErrorCode::InvalidAccountInput
    );

    let burn_height = Clock::get()?.slot;
    let env = LockEnv {
        config: &ctx.accounts.pool_config,
        pool: ctx.accounts.pool_operator.key(),
        pox_address: &pox_address,
        payer: ctx.accounts.pool_operator.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
        partial_stack: &ctx.accounts.partial_stack,
        pool_cycle_total: &ctx.accounts.pool_cycle_total,
        burn_height,
        start_burn_height,
    };

    let mut outcomes = Vec::with_capacity(amounts_ustx.len());
    let mut status_entries = Vec::new();
    let mut target_cycle = None;
    for (group, amount) in groups.zip(amounts_ustx.into_iter()) {
        let member = MemberAccounts {
            user: &group[0],
            delegation: &group[1],
            user_lock: &group[2],
            user_cycle_stake: &group[3],
        };
        match apply_lock(&env, &member, amount) {
            Ok(applied) => {
                if applied.plan.action != LockAction::TopUp {
                    status_entries.push(applied.status_entry.clone());
                    target_cycle = Some(applied.plan.target_cycle);
                }
                outcomes.push(LockOutcome::Locked(applied.receipt));
            }
            Err(err) => outcomes.push(LockOutcome::Failed(outcome_code(err))),
        }
    }

    if let Some(cycle) = target_cycle {
        append_status_entries(
            &ctx.accounts.status_list_meta,
            &ctx.accounts.status_list_entry,
            &env.payer,
            &env.system_program,
            env.pool,
            cycle,
            status_entries,
        )?;
    }

    msg!("processed batch of {} members", outcomes.len());
    Ok(outcomes)
}
