use anchor_lang::prelude::*;

declare_id!("2Zm524mSjahzEeAcbtzxrkLPXBmxCV6zCpUvE71KFuNG");

#[cfg(not(feature = "no-entrypoint"))]
solana_security_txt::security_txt! {
    name: "stacking-pool",
    project_url: "https://github.com/stacking-pool/stacking-pool",
    contacts: "email:security@stacking-pool.dev",
    policy: "https://github.com/stacking-pool/stacking-pool/blob/main/SECURITY.md",
    preferred_languages: "en"
}

pub const POOL_CONFIG_SEED: &str = "pool_config";
pub const ALLOWANCE_SEED: &str = "allowance";
pub const DELEGATION_SEED: &str = "delegation";
pub const USER_LOCK_SEED: &str = "user_lock";
pub const USER_CYCLE_STAKE_SEED: &str = "user_cycle_stake";
pub const PARTIAL_STACK_SEED: &str = "partial_stack";
pub const POOL_CYCLE_TOTAL_SEED: &str = "pool_total";
pub const REWARD_CYCLE_META_SEED: &str = "reward_cycle_meta";
pub const REWARD_ADDR_INDEX_SEED: &str = "reward_addr_index";
pub const REWARD_SET_SEED: &str = "reward_set";
pub const STATUS_META_SEED: &str = "status_meta";
pub const STATUS_LIST_SEED: &str = "status_list";
pub const USED_AUTH_SEED: &str = "used_signer_auth";
pub const REWARD_DEPOSIT_SEED: &str = "reward_deposit";
pub const AUTO_EXTEND_SEED: &str = "auto_extend";

/// Burn blocks per reward cycle.
pub const DEFAULT_REWARD_CYCLE_LENGTH: u64 = 1050;
/// Burn blocks of the prepare phase at the end of each cycle.
pub const DEFAULT_PREPARE_CYCLE_LENGTH: u64 = 50;
pub const MICRO_STX_PER_STX: u128 = 1_000_000;
/// Non-stackable reserve kept on user accounts by self-service pools.
pub const DEFAULT_STX_BUFFER: u128 = MICRO_STX_PER_STX;
/// Batch cap for lock/distribute style operations; callers shard beyond it.
pub const MAX_POOL_MEMBERS: usize = 30;
pub const MAX_REWARD_ADMINS: usize = 5;
/// Aggregation authorizations always cover a single reward cycle.
pub const AGG_AUTH_PERIOD: u64 = 1;

pub mod error;
pub mod instructions;
pub mod pox;
pub mod states;
pub mod utils;

use instructions::*;
use pox::PoxAddress;
use states::*;

#[program]
pub mod stacking_pool {

    use super::*;

    pub fn initialize_pool(
        ctx: Context<InitializePool>,
        pool_pox_address: PoxAddress,
        stx_buffer_ustx: u128,
        stacking_threshold_ustx: u128,
        lock_period: u64,
    ) -> Result<()> {
        instructions::initialize_pool(
            ctx,
            pool_pox_address,
            stx_buffer_ustx,
            stacking_threshold_ustx,
            lock_period,
        )
    }

    pub fn allow_contract_caller(
        ctx: Context<AllowContractCaller>,
        contract: Pubkey,
        until_burn_height: Option<u64>,
    ) -> Result<bool> {
        instructions::allow_contract_caller(ctx, contract, until_burn_height)
    }

    pub fn revoke_contract_caller(
        ctx: Context<RevokeContractCaller>,
        contract: Pubkey,
    ) -> Result<bool> {
        instructions::revoke_contract_caller(ctx, contract)
    }

    pub fn delegate_stx(
        ctx: Context<DelegateStx>,
        amount_ustx: u128,
        delegate_to: Pubkey,
        until_burn_height: Option<u64>,
        pool_pox_address: Option<PoxAddress>,
        user_pox_address: PoxAddress,
    ) -> Result<bool> {
        instructions::delegate_stx(
            ctx,
            amount_ustx,
            delegate_to,
            until_burn_height,
            pool_pox_address,
            user_pox_address,
        )
    }

    pub fn revoke_delegate_stx(ctx: Context<RevokeDelegateStx>) -> Result<Option<DelegationData>> {
        instructions::revoke_delegate_stx(ctx)
    }

    pub fn delegate_stack_stx(
        ctx: Context<DelegateStackStx>,
        amount_ustx: u128,
        pox_address: PoxAddress,
        start_burn_height: u64,
    ) -> Result<LockReceipt> {
        instructions::delegate_stack_stx(ctx, amount_ustx, pox_address, start_burn_height)
    }

    pub fn delegate_stack_stx_many<'info>(
        ctx: Context<'_, '_, 'info, 'info, DelegateStackStxMany<'info>>,
        amounts_ustx: Vec<u128>,
        pox_address: PoxAddress,
        start_burn_height: u64,
    ) -> Result<Vec<LockOutcome>> {
        instructions::delegate_stack_stx_many(ctx, amounts_ustx, pox_address, start_burn_height)
    }

    pub fn stack_aggregation_commit_indexed(
        ctx: Context<StackAggregationCommit>,
        pox_address: PoxAddress,
        reward_cycle: u64,
        signature: [u8; 65],
        signer_key: [u8; 33],
        max_amount_ustx: u128,
        auth_id: u64,
    ) -> Result<u64> {
        instructions::stack_aggregation_commit_indexed(
            ctx,
            pox_address,
            reward_cycle,
            signature,
            signer_key,
            max_amount_ustx,
            auth_id,
        )
    }

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
        instructions::stack_aggregation_increase(
            ctx,
            pox_address,
            reward_cycle,
            reward_set_index,
            signature,
            signer_key,
            max_amount_ustx,
            auth_id,
        )
    }

    pub fn get_status(ctx: Context<GetStatus>, pool: Pubkey, cycle: u64) -> Result<StatusResponse> {
        instructions::get_status(ctx, pool, cycle)
    }

    pub fn get_user_data(ctx: Context<GetUserData>) -> Result<Option<UserData>> {
        instructions::get_user_data(ctx)
    }

    pub fn get_status_list(
        ctx: Context<GetStatusList>,
        pool: Pubkey,
        cycle: u64,
        index: u64,
    ) -> Result<Option<Vec<StatusEntry>>> {
        instructions::get_status_list(ctx, pool, cycle, index)
    }

    pub fn get_status_lists_last_index(
        ctx: Context<GetStatusListsLastIndex>,
        pool: Pubkey,
        cycle: u64,
    ) -> Result<u64> {
        instructions::get_status_lists_last_index(ctx, pool, cycle)
    }

    pub fn get_total(ctx: Context<GetTotal>, pool: Pubkey, cycle: u64) -> Result<u128> {
        instructions::get_total(ctx, pool, cycle)
    }

    pub fn get_partial_stacked_by_cycle(
        ctx: Context<GetPartialStackedByCycle>,
        pool: Pubkey,
        pox_address: PoxAddress,
        cycle: u64,
    ) -> Result<Option<u128>> {
        instructions::get_partial_stacked_by_cycle(ctx, pool, pox_address, cycle)
    }

    pub fn not_locked_for_cycle(
        ctx: Context<GetPoxInfo>,
        unlock_burn_height: u64,
        cycle: u64,
    ) -> Result<bool> {
        instructions::not_locked_for_cycle(ctx, unlock_burn_height, cycle)
    }

    pub fn get_pox_info(ctx: Context<GetPoxInfo>) -> Result<PoxInfoResponse> {
        instructions::get_pox_info(ctx)
    }

    pub fn calculate_share(
        ctx: Context<GetPoxInfo>,
        user_ustx: u128,
        total_ustx: u128,
        reward_pool_ustx: u128,
    ) -> Result<u128> {
        instructions::calculate_share(ctx, user_ustx, total_ustx, reward_pool_ustx)
    }

    pub fn set_auto_extend_users(
        ctx: Context<SetAutoExtendUsers>,
        users: Vec<Pubkey>,
    ) -> Result<bool> {
        instructions::set_auto_extend_users(ctx, users)
    }

    pub fn run_auto_extend_job<'info>(
        ctx: Context<'_, '_, 'info, 'info, RunAutoExtendJob<'info>>,
    ) -> Result<bool> {
        instructions::run_auto_extend_job(ctx)
    }

    pub fn deposit_rewards(
        ctx: Context<DepositRewards>,
        amount_ustx: u128,
        cycle: u64,
    ) -> Result<u64> {
        instructions::deposit_rewards(ctx, amount_ustx, cycle)
    }

    pub fn distribute_rewards_many<'info>(
        ctx: Context<'_, '_, 'info, 'info, DistributeRewardsMany<'info>>,
        cycle: u64,
    ) -> Result<bool> {
        instructions::distribute_rewards_many(ctx, cycle)
    }

    pub fn set_reward_admin(
        ctx: Context<UpdatePoolConfig>,
        admin: Pubkey,
        enable: bool,
    ) -> Result<bool> {
        instructions::set_reward_admin(ctx, admin, enable)
    }

    pub fn set_active(ctx: Context<UpdatePoolConfig>, active: bool) -> Result<bool> {
        instructions::set_active(ctx, active)
    }

    pub fn set_stx_buffer(ctx: Context<UpdatePoolConfig>, amount_ustx: u128) -> Result<bool> {
        instructions::set_stx_buffer(ctx, amount_ustx)
    }

    pub fn set_pool_pox_address(
        ctx: Context<UpdatePoolConfig>,
        pox_address: PoxAddress,
    ) -> Result<bool> {
        instructions::set_pool_pox_address(ctx, pox_address)
    }
}
