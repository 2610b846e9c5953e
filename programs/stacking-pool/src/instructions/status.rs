use anchor_lang::prelude::*;
use anchor_lang::solana_program::clock::Clock;

use crate::error::ErrorCode;
use crate::pox::PoxAddress;
use crate::states::*;
use crate::utils::load_entry_at;
use crate::{
    DELEGATION_SEED, PARTIAL_STACK_SEED, POOL_CONFIG_SEED, POOL_CYCLE_TOTAL_SEED,
    STATUS_LIST_SEED, STATUS_META_SEED, USER_CYCLE_STAKE_SEED, USER_LOCK_SEED,
};

//
// ──────────────────────────────────────────────────────────────────────────────
// Read-only projections over delegation, lock and accumulator state.
// All of them return typed values and mutate nothing.
// ──────────────────────────────────────────────────────────────────────────────
//

/// Accounts context for `get_status`.
#[derive(Accounts)]
pub struct GetStatus<'info> {
    /// Pool configuration (cycle geometry).
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// The user being queried.
    ///
    /// CHECK: Key only.
    pub user: UncheckedAccount<'info>,

    /// Delegation record of the user.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub delegation: UncheckedAccount<'info>,

    /// Lock position of the user.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub user_lock: UncheckedAccount<'info>,

    /// Per-cycle stake row of the user for the queried cycle.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub user_cycle_stake: UncheckedAccount<'info>,

    /// Locked total of the *queried* pool for the cycle.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub pool_cycle_total: UncheckedAccount<'info>,
}

/// Combined per-user status for `cycle`, scoped to `pool`.
///
/// `total_ustx` is keyed by the pool argument: querying with a pool other
/// than the one that actually locked yields 0 while the user's own lock
/// info stays visible. Totals are pool-scoped aggregates, user info is
/// delegation-scoped.
pub fn get_status(ctx: Context<GetStatus>, pool: Pubkey, cycle: u64) -> Result<StatusResponse> {
    let config = &ctx.accounts.pool_config;
    let sched = config.schedule();
    let user = ctx.accounts.user.key();

    let lock_seeds: &[&[u8]] = &[USER_LOCK_SEED.as_bytes(), user.as_ref()];
    let lock = load_entry_at::<UserLockState>(&ctx.accounts.user_lock, lock_seeds)?
        .ok_or(ErrorCode::NoStackerInfo)?;
    require!(
        cycle >= lock.first_reward_cycle
            && !sched.not_locked_for_cycle(lock.unlock_burn_height, cycle),
        ErrorCode::NoStackerInfo
    );

    let delegation_seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.as_ref()];
    let delegation =
        load_entry_at::<DelegationRecord>(&ctx.accounts.delegation, delegation_seeds)?;

    let cycle_le = cycle.to_le_bytes();
    let stake_seeds: &[&[u8]] = &[USER_CYCLE_STAKE_SEED.as_bytes(), user.as_ref(), &cycle_le];
    let amount_ustx =
        load_entry_at::<UserCycleStake>(&ctx.accounts.user_cycle_stake, stake_seeds)?
            .map(|stake| stake.amount_ustx)
            .unwrap_or(lock.locked_amount);

    let total_seeds: &[&[u8]] = &[POOL_CYCLE_TOTAL_SEED.as_bytes(), pool.as_ref(), &cycle_le];
    let total_ustx = load_entry_at::<PoolCycleTotal>(&ctx.accounts.pool_cycle_total, total_seeds)?
        .map(|total| total.total_ustx)
        .unwrap_or(0);

    let (pox_address, delegation_cycle) = match delegation {
        Some(record) => (record.user_pox_address.clone(), record.cycle),
        None => (lock.pox_address.clone(), lock.first_reward_cycle),
    };

    Ok(StatusResponse {
        stacker_info: StackerInfo {
            first_reward_cycle: lock.first_reward_cycle,
        },
        user_info: UserInfo {
            pox_address,
            cycle: delegation_cycle,
            amount_ustx,
        },
        total_ustx,
    })
}

/// Accounts context for `get_user_data`.
#[derive(Accounts)]
pub struct GetUserData<'info> {
    /// The user being queried.
    ///
    /// CHECK: Key only.
    pub user: UncheckedAccount<'info>,

    /// Delegation record of the user.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub delegation: UncheckedAccount<'info>,
}

/// Reward address and delegation cycle of the user; `None` if the user
/// never delegated.
pub fn get_user_data(ctx: Context<GetUserData>) -> Result<Option<UserData>> {
    let user = ctx.accounts.user.key();
    let delegation_seeds: &[&[u8]] = &[DELEGATION_SEED.as_bytes(), user.as_ref()];
    let record = load_entry_at::<DelegationRecord>(&ctx.accounts.delegation, delegation_seeds)?;
    Ok(record.map(|record| UserData {
        pox_address: record.user_pox_address,
        cycle: record.cycle,
    }))
}

/// Accounts context for `get_status_list`.
#[derive(Accounts)]
pub struct GetStatusList<'info> {
    /// The requested lock-event log page.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub status_list_entry: UncheckedAccount<'info>,
}

/// One page of the (pool, cycle) lock-event log; `None` past the end.
pub fn get_status_list(
    ctx: Context<GetStatusList>,
    pool: Pubkey,
    cycle: u64,
    index: u64,
) -> Result<Option<Vec<StatusEntry>>> {
    let cycle_le = cycle.to_le_bytes();
    let index_le = index.to_le_bytes();
    let entry_seeds: &[&[u8]] = &[
        STATUS_LIST_SEED.as_bytes(),
        pool.as_ref(),
        &cycle_le,
        &index_le,
    ];
    let entry = load_entry_at::<StatusListEntry>(&ctx.accounts.status_list_entry, entry_seeds)?;
    Ok(entry.map(|entry| entry.members))
}

/// Accounts context for `get_status_lists_last_index`.
#[derive(Accounts)]
pub struct GetStatusListsLastIndex<'info> {
    /// Lock-event log counter for (pool, cycle).
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub status_list_meta: UncheckedAccount<'info>,
}

/// Index of the newest log page for (pool, cycle); 0 while the log is empty.
pub fn get_status_lists_last_index(
    ctx: Context<GetStatusListsLastIndex>,
    pool: Pubkey,
    cycle: u64,
) -> Result<u64> {
    let cycle_le = cycle.to_le_bytes();
    let meta_seeds: &[&[u8]] = &[STATUS_META_SEED.as_bytes(), pool.as_ref(), &cycle_le];
    let meta = load_entry_at::<StatusListMeta>(&ctx.accounts.status_list_meta, meta_seeds)?;
    Ok(meta.map(|meta| meta.last_index()).unwrap_or(0))
}

/// Accounts context for `get_total`.
#[derive(Accounts)]
pub struct GetTotal<'info> {
    /// Pool-scoped locked total for the cycle.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub pool_cycle_total: UncheckedAccount<'info>,
}

/// Locked total of `pool` for `cycle`; 0 when nothing was locked.
pub fn get_total(ctx: Context<GetTotal>, pool: Pubkey, cycle: u64) -> Result<u128> {
    let cycle_le = cycle.to_le_bytes();
    let total_seeds: &[&[u8]] = &[POOL_CYCLE_TOTAL_SEED.as_bytes(), pool.as_ref(), &cycle_le];
    let total = load_entry_at::<PoolCycleTotal>(&ctx.accounts.pool_cycle_total, total_seeds)?;
    Ok(total.map(|total| total.total_ustx).unwrap_or(0))
}

/// Accounts context for `get_partial_stacked_by_cycle`.
#[derive(Accounts)]
pub struct GetPartialStackedByCycle<'info> {
    /// Partial-stack accumulator for the queried triple.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub partial_stack: UncheckedAccount<'info>,
}

/// Pre-commit running total for (pool, reward address, cycle); `None`
/// before any lock targeted the triple.
pub fn get_partial_stacked_by_cycle(
    ctx: Context<GetPartialStackedByCycle>,
    pool: Pubkey,
    pox_address: PoxAddress,
    cycle: u64,
) -> Result<Option<u128>> {
    let addr_hash = pox_address.seed_hash();
    let cycle_le = cycle.to_le_bytes();
    let partial_seeds: &[&[u8]] = &[
        PARTIAL_STACK_SEED.as_bytes(),
        pool.as_ref(),
        addr_hash.as_ref(),
        &cycle_le,
    ];
    let partial = load_entry_at::<PartialStackEntry>(&ctx.accounts.partial_stack, partial_seeds)?;
    Ok(partial.map(|partial| partial.stacked_ustx))
}

/// Accounts context for the pure cycle queries.
#[derive(Accounts)]
pub struct GetPoxInfo<'info> {
    /// Pool configuration (cycle geometry).
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,
}

/// Whether a position with `unlock_burn_height` is fully unlocked by the
/// time `cycle` begins.
pub fn not_locked_for_cycle(
    ctx: Context<GetPoxInfo>,
    unlock_burn_height: u64,
    cycle: u64,
) -> Result<bool> {
    let sched = ctx.accounts.pool_config.schedule();
    Ok(sched.not_locked_for_cycle(unlock_burn_height, cycle))
}

/// Proportional share of `reward_pool_ustx` owed to `user_ustx` out of
/// `total_ustx`; rounds down, never up.
pub fn calculate_share(
    _ctx: Context<GetPoxInfo>,
    user_ustx: u128,
    total_ustx: u128,
    reward_pool_ustx: u128,
) -> Result<u128> {
    Ok(crate::pox::shares::calculate_share(
        user_ustx,
        total_ustx,
        reward_pool_ustx,
    ))
}

/// Cycle geometry snapshot in the shape of the base protocol's
/// `get-pox-info`.
pub fn get_pox_info(ctx: Context<GetPoxInfo>) -> Result<PoxInfoResponse> {
    let config = &ctx.accounts.pool_config;
    let burn_height = Clock::get()?.slot;
    Ok(PoxInfoResponse {
        reward_cycle_id: config.schedule().cycle_of(burn_height),
        reward_cycle_length: config.reward_cycle_length,
        prepare_cycle_length: config.prepare_cycle_length,
        half_cycle_length: config.half_cycle_length(),
        first_burn_height: config.first_burn_height,
    })
}
