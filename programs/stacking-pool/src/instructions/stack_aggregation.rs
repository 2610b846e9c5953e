use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::pox::signature::{
    verify_authorization, AuthorizationVerifier, CommitAuthorization, Secp256k1Verifier,
    TOPIC_AGG_COMMIT, TOPIC_AGG_INCREASE,
};
use crate::pox::PoxAddress;
use crate::states::*;
use crate::utils::{load_entry_at, load_or_create_entry, store_entry};
use crate::{
    AGG_AUTH_PERIOD, PARTIAL_STACK_SEED, POOL_CONFIG_SEED, REWARD_ADDR_INDEX_SEED,
    REWARD_CYCLE_META_SEED, REWARD_SET_SEED, USED_AUTH_SEED,
};

/// Accounts context for `stack_aggregation_commit_indexed`.
#[derive(Accounts)]
pub struct StackAggregationCommit<'info> {
    /// Pool operator committing its accumulated stake; pays for new entries.
    #[account(mut)]
    pub pool_operator: Signer<'info>,

    /// Pool configuration (threshold and reward address).
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Partial-stack accumulator being consumed.
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub partial_stack: UncheckedAccount<'info>,

    /// Per-cycle reward-set index allocator.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub reward_cycle_meta: UncheckedAccount<'info>,

    /// Stable (cycle, reward address) → index mapping.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub reward_address_index: UncheckedAccount<'info>,

    /// Reward-set aggregate receiving the committed stake.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub reward_set_entry: UncheckedAccount<'info>,

    /// Replay guard for the signer authorization.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub used_authorization: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

struct AuthorizedDelta {
    delta_ustx: u128,
}

/// Validate the signer authorization, enforce single use and compute the
/// uncommitted delta of the pool's partial stack.
#[allow(clippy::too_many_arguments)]
fn consume_authorization<'info>(
    verifier: &impl AuthorizationVerifier,
    partial_info: &AccountInfo<'info>,
    used_auth_info: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    pool: Pubkey,
    pox_address: &PoxAddress,
    topic: &[u8],
    reward_cycle: u64,
    signature: &[u8; 65],
    signer_key: &[u8; 33],
    max_amount_ustx: u128,
    auth_id: u64,
) -> Result<(AuthorizedDelta, PartialStackEntry)> {
    let auth = CommitAuthorization {
        topic,
        reward_cycle,
        period: AGG_AUTH_PERIOD,
        max_amount_ustx,
        pox_address,
        auth_id,
    };
    verify_authorization(verifier, &auth, signature, signer_key)?;

    // Each signed tuple authorizes exactly one action.
    let digest = auth.digest();
    let used_seeds: &[&[u8]] = &[USED_AUTH_SEED.as_bytes(), digest.as_ref()];
    let (mut used, used_bump): (UsedSignerAuthorization, u8) = load_or_create_entry(
        used_auth_info,
        payer,
        system_program,
        used_seeds,
        UsedSignerAuthorization::LEN,
    )?;
    require!(!used.used, ErrorCode::SignatureInvalid);
    used.bump = used_bump;
    used.used = true;
    store_entry(used_auth_info, &used)?;

    let addr_hash = pox_address.seed_hash();
    let cycle_le = reward_cycle.to_le_bytes();
    let partial_seeds: &[&[u8]] = &[
        PARTIAL_STACK_SEED.as_bytes(),
        pool.as_ref(),
        addr_hash.as_ref(),
        &cycle_le,
    ];
    let partial = load_entry_at::<PartialStackEntry>(partial_info, partial_seeds)?
        .unwrap_or_default();

    let delta_ustx = partial.uncommitted_ustx();
    require!(delta_ustx <= max_amount_ustx, ErrorCode::SignatureInvalid);
    Ok((AuthorizedDelta { delta_ustx }, partial))
}

/// Commit the pool's accumulated partial stack for `reward_cycle` against
/// the pool's reward address and return the assigned reward-set index.
///
/// The index is stable: a re-commit for the same (cycle, address) resolves
/// to the same slot, a new address gets the next one.
///
/// # Fails
/// - `SignatureInvalid` for a bad signature, a replayed `auth_id` or a
///   delta above `max_amount_ustx`.
/// - `StackingThresholdNotMet` while the partial stack is below the
///   configured minimum.
/// - `NonPositiveAmount` when nothing new has accumulated.
pub fn stack_aggregation_commit_indexed(
    ctx: Context<StackAggregationCommit>,
    pox_address: PoxAddress,
    reward_cycle: u64,
    signature: [u8; 65],
    signer_key: [u8; 33],
    max_amount_ustx: u128,
    auth_id: u64,
) -> Result<u64> {
    pox_address.validate()?;
    let config = &ctx.accounts.pool_config;
    let pool = ctx.accounts.pool_operator.key();
    let payer = ctx.accounts.pool_operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    let (authorized, mut partial) = consume_authorization(
        &Secp256k1Verifier,
        &ctx.accounts.partial_stack,
        &ctx.accounts.used_authorization,
        &payer,
        &system_program,
        pool,
        &pox_address,
        TOPIC_AGG_COMMIT,
        reward_cycle,
        &signature,
        &signer_key,
        max_amount_ustx,
        auth_id,
    )?;

    require!(
        partial.stacked_ustx >= config.stacking_threshold_ustx,
        ErrorCode::StackingThresholdNotMet
    );
    require!(authorized.delta_ustx > 0, ErrorCode::NonPositiveAmount);

    // Resolve the reward-set index, allocating the next one for a fresh
    // (cycle, address) pair.
    let cycle_le = reward_cycle.to_le_bytes();
    let addr_hash = pox_address.seed_hash();
    let meta_seeds: &[&[u8]] = &[REWARD_CYCLE_META_SEED.as_bytes(), &cycle_le];
    let (mut meta, meta_bump): (RewardCycleMeta, u8) = load_or_create_entry(
        &ctx.accounts.reward_cycle_meta,
        &payer,
        &system_program,
        meta_seeds,
        RewardCycleMeta::LEN,
    )?;
    let addr_index_seeds: &[&[u8]] = &[
        REWARD_ADDR_INDEX_SEED.as_bytes(),
        &cycle_le,
        addr_hash.as_ref(),
    ];
    let (mut addr_index, addr_index_bump): (RewardAddressIndex, u8) = load_or_create_entry(
        &ctx.accounts.reward_address_index,
        &payer,
        &system_program,
        addr_index_seeds,
        RewardAddressIndex::LEN,
    )?;
    if addr_index.pox_address.hashbytes.is_empty() {
        addr_index.bump = addr_index_bump;
        addr_index.cycle = reward_cycle;
        addr_index.index = meta.next_index;
        addr_index.pox_address = pox_address.clone();
        store_entry(&ctx.accounts.reward_address_index, &addr_index)?;

        meta.bump = meta_bump;
        meta.cycle = reward_cycle;
        meta.next_index += 1;
        store_entry(&ctx.accounts.reward_cycle_meta, &meta)?;
    }
    let index = addr_index.index;

    let index_le = index.to_le_bytes();
    let entry_seeds: &[&[u8]] = &[REWARD_SET_SEED.as_bytes(), &cycle_le, &index_le];
    let (mut entry, entry_bump): (RewardSetEntry, u8) = load_or_create_entry(
        &ctx.accounts.reward_set_entry,
        &payer,
        &system_program,
        entry_seeds,
        RewardSetEntry::LEN,
    )?;
    entry.bump = entry_bump;
    entry.cycle = reward_cycle;
    entry.index = index;
    if entry.pox_address.hashbytes.is_empty() {
        entry.pox_address = pox_address.clone();
    }
    entry.total_ustx = entry
        .total_ustx
        .checked_add(authorized.delta_ustx)
        .ok_or(ErrorCode::Overflow)?;
    store_entry(&ctx.accounts.reward_set_entry, &entry)?;

    partial.committed_ustx = partial.stacked_ustx;
    store_entry(&ctx.accounts.partial_stack, &partial)?;

    emit!(AggregationCommitted {
        pool,
        cycle: reward_cycle,
        reward_set_index: index,
        amount_ustx: authorized.delta_ustx,
    });
    Ok(index)
}

/// Accounts context for `stack_aggregation_increase`.
#[derive(Accounts)]
pub struct StackAggregationIncrease<'info> {
    /// Pool operator topping up an existing aggregate; pays for new entries.
    #[account(mut)]
    pub pool_operator: Signer<'info>,

    /// Pool configuration.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Partial-stack accumulator being consumed.
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub partial_stack: UncheckedAccount<'info>,

    /// Stable (cycle, reward address) → index mapping; must already exist.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub reward_address_index: UncheckedAccount<'info>,

    /// Reward-set aggregate receiving the newly accumulated stake.
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub reward_set_entry: UncheckedAccount<'info>,

    /// Replay guard for the signer authorization.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub used_authorization: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Add the stake accumulated since the last commit or increase to the
/// reward-set entry at `reward_set_index`.
///
/// Distinct pools may independently increase a shared reward address and
/// index; each consumes its own partial stack under its own `auth_id`.
pub fn stack_aggregation_increase(
    ctx: Context<StackAggregationIncrease>,
    pox_address: PoxAddress,
    reward_cycle: u64,
    reward_set_index: u64,
    signature: [u8; 65],
    signer_key: [u8; 33],
    max_amount_ustx: u128,
    auth_id: u64,
) -> Result<bool> {
    pox_address.validate()?;
    let pool = ctx.accounts.pool_operator.key();
    let payer = ctx.accounts.pool_operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    let (authorized, mut partial) = consume_authorization(
        &Secp256k1Verifier,
        &ctx.accounts.partial_stack,
        &ctx.accounts.used_authorization,
        &payer,
        &system_program,
        pool,
        &pox_address,
        TOPIC_AGG_INCREASE,
        reward_cycle,
        &signature,
        &signer_key,
        max_amount_ustx,
        auth_id,
    )?;
    require!(authorized.delta_ustx > 0, ErrorCode::NonPositiveAmount);

    let cycle_le = reward_cycle.to_le_bytes();
    let addr_hash = pox_address.seed_hash();
    let addr_index_seeds: &[&[u8]] = &[
        REWARD_ADDR_INDEX_SEED.as_bytes(),
        &cycle_le,
        addr_hash.as_ref(),
    ];
    let addr_index = load_entry_at::<RewardAddressIndex>(
        &ctx.accounts.reward_address_index,
        addr_index_seeds,
    )?
    .ok_or(ErrorCode::NotFound)?;
    require!(addr_index.index == reward_set_index, ErrorCode::NotFound);

    let index_le = reward_set_index.to_le_bytes();
    let entry_seeds: &[&[u8]] = &[REWARD_SET_SEED.as_bytes(), &cycle_le, &index_le];
    let mut entry =
        load_entry_at::<RewardSetEntry>(&ctx.accounts.reward_set_entry, entry_seeds)?
            .ok_or(ErrorCode::NotFound)?;
    entry.total_ustx = entry
        .total_ustx
        .checked_add(authorized.delta_ustx)
        .ok_or(ErrorCode::Overflow)?;
    store_entry(&ctx.accounts.reward_set_entry, &entry)?;

    partial.committed_ustx = partial.stacked_ustx;
    store_entry(&ctx.accounts.partial_stack, &partial)?;

    emit!(AggregationIncreased {
        pool,
        cycle: reward_cycle,
        reward_set_index,
        amount_ustx: authorized.delta_ustx,
    });
    Ok(true)
}
