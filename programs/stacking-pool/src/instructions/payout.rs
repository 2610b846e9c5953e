use anchor_lang::prelude::*;
use anchor_lang::solana_program::clock::Clock;

use crate::error::ErrorCode;
use crate::pox::shares::plan_distribution;
use crate::states::*;
use crate::utils::{load_entry, load_entry_at, load_or_create_entry, store_entry};
use crate::{MAX_POOL_MEMBERS, POOL_CONFIG_SEED, POOL_CYCLE_TOTAL_SEED, REWARD_DEPOSIT_SEED};

/// Accounts context for `deposit_rewards`.
#[derive(Accounts)]
pub struct DepositRewards<'info> {
    /// Reward admin making the deposit; pays for the record on first use.
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Pool configuration (admin set and deposit sequence).
    #[account(
        mut,
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Pool-scoped locked total of the cycle being paid for.
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub pool_cycle_total: UncheckedAccount<'info>,

    /// Reward pool of the cycle.
    ///
    /// CHECK: Derivation and creation are handled in the instruction.
    #[account(mut)]
    pub reward_deposit: UncheckedAccount<'info>,

    /// System Program (for account creation).
    pub system_program: Program<'info, System>,
}

/// Record a reward deposit for a closed cycle and return its sequence id.
///
/// # Fails
/// - `Forbidden` when the caller is not a reward admin.
/// - `NotFound` when the pool recorded no locked total for `cycle`.
/// - `TooEarly` while `cycle` has not fully elapsed.
pub fn deposit_rewards(ctx: Context<DepositRewards>, amount_ustx: u128, cycle: u64) -> Result<u64> {
    let config = &mut ctx.accounts.pool_config;
    require!(
        config.is_reward_admin(&ctx.accounts.admin.key()),
        ErrorCode::Forbidden
    );
    require!(amount_ustx > 0, ErrorCode::NonPositiveAmount);

    let cycle_le = cycle.to_le_bytes();
    let total_seeds: &[&[u8]] = &[
        POOL_CYCLE_TOTAL_SEED.as_bytes(),
        config.operator.as_ref(),
        &cycle_le,
    ];
    let total = load_entry_at::<PoolCycleTotal>(&ctx.accounts.pool_cycle_total, total_seeds)?
        .ok_or(ErrorCode::NotFound)?;
    require!(total.total_ustx > 0, ErrorCode::NotFound);

    let burn_height = Clock::get()?.slot;
    let current_cycle = config.schedule().cycle_of(burn_height);
    require!(current_cycle > cycle, ErrorCode::TooEarly);

    let deposit_seeds: &[&[u8]] = &[REWARD_DEPOSIT_SEED.as_bytes(), &cycle_le];
    let (mut deposit, bump): (RewardDeposit, u8) = load_or_create_entry(
        &ctx.accounts.reward_deposit,
        &ctx.accounts.admin.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        deposit_seeds,
        RewardDeposit::LEN,
    )?;
    deposit.bump = bump;
    deposit.cycle = cycle;
    deposit.total_deposited_ustx = deposit
        .total_deposited_ustx
        .checked_add(amount_ustx)
        .ok_or(ErrorCode::Overflow)?;
    deposit.remaining_ustx = deposit
        .remaining_ustx
        .checked_add(amount_ustx)
        .ok_or(ErrorCode::Overflow)?;
    deposit.depositor = ctx.accounts.admin.key();
    store_entry(&ctx.accounts.reward_deposit, &deposit)?;

    config.deposit_count += 1;
    let sequence = config.deposit_count;

    emit!(RewardsDeposited {
        cycle,
        amount_ustx,
        sequence,
        depositor: deposit.depositor,
    });
    Ok(sequence)
}

/// Accounts context for `distribute_rewards_many`.
///
/// Remaining accounts carry one `UserCycleStake` row per listed user.
#[derive(Accounts)]
pub struct DistributeRewardsMany<'info> {
    /// Anyone may trigger a distribution.
    pub caller: Signer<'info>,

    /// Pool configuration.
    #[account(
        seeds = [POOL_CONFIG_SEED.as_bytes()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    /// Pool-scoped locked total of the cycle (share denominator).
    ///
    /// CHECK: Derivation is validated in the instruction.
    pub pool_cycle_total: UncheckedAccount<'info>,

    /// Reward pool being drawn down.
    ///
    /// CHECK: Derivation is validated in the instruction.
    #[account(mut)]
    pub reward_deposit: UncheckedAccount<'info>,
}

/// Pay every listed user its proportional share of the cycle's deposit.
///
/// The remaining deposit must cover the recomputed shares of *all* listed
/// users; otherwise nothing is paid and `InsufficientFunds` is returned.
/// Users already paid for the cycle are skipped, never double-paid.
pub fn distribute_rewards_many<'info>(
    ctx: Context<'_, '_, 'info, 'info, DistributeRewardsMany<'info>>,
    cycle: u64,
) -> Result<bool> {
    let config = &ctx.accounts.pool_config;
    require!(
        ctx.remaining_accounts.len() <= MAX_POOL_MEMBERS,
        ErrorCode::BatchTooLarge
    );

    let cycle_le = cycle.to_le_bytes();
    let total_seeds: &[&[u8]] = &[
        POOL_CYCLE_TOTAL_SEED.as_bytes(),
        config.operator.as_ref(),
        &cycle_le,
    ];
    let total = load_entry_at::<PoolCycleTotal>(&ctx.accounts.pool_cycle_total, total_seeds)?
        .ok_or(ErrorCode::NotFound)?;

    let deposit_seeds: &[&[u8]] = &[REWARD_DEPOSIT_SEED.as_bytes(), &cycle_le];
    let mut deposit =
        load_entry_at::<RewardDeposit>(&ctx.accounts.reward_deposit, deposit_seeds)?
            .ok_or(ErrorCode::NotFound)?;

    // Snapshot every listed position first; the funding check covers the
    // whole list, paid rows included.
    let mut positions = Vec::with_capacity(ctx.remaining_accounts.len());
    let mut stakes = Vec::with_capacity(ctx.remaining_accounts.len());
    for stake_info in ctx.remaining_accounts.iter() {
        let stake = load_entry::<UserCycleStake>(stake_info)?;
        match stake {
            Some(stake) => {
                require!(
                    stake.cycle == cycle && stake.pool == config.operator,
                    ErrorCode::InvalidAccountInput
                );
                positions.push((stake.amount_ustx, stake.rewards_paid));
                stakes.push(Some(stake));
            }
            None => {
                positions.push((0, false));
                stakes.push(None);
            }
        }
    }

    let shares = plan_distribution(
        &positions,
        total.total_ustx,
        deposit.total_deposited_ustx,
        deposit.remaining_ustx,
    )?;

    let mut users_paid: u64 = 0;
    let mut total_paid: u128 = 0;
    for ((stake, share), stake_info) in stakes
        .into_iter()
        .zip(shares.into_iter())
        .zip(ctx.remaining_accounts.iter())
    {
        let Some(mut stake) = stake else { continue };
        if stake.rewards_paid {
            continue;
        }
        stake.rewards_paid = true;
        store_entry(stake_info, &stake)?;

        deposit.remaining_ustx = deposit
            .remaining_ustx
            .checked_sub(share)
            .ok_or(ErrorCode::InsufficientFunds)?;
        users_paid += 1;
        total_paid = total_paid.saturating_add(share);
    }
    store_entry(&ctx.accounts.reward_deposit, &deposit)?;

    emit!(RewardsDistributed {
        cycle,
        users_paid,
        total_paid_ustx: total_paid,
    });
    Ok(true)
}
