//! Lock planning: the pure decision tree behind `delegate-stack-stx`.
//!
//! Handlers collect snapshots of the relevant records, call [`plan_lock`] and
//! apply the returned plan. Keeping the tree pure keeps every error arm and
//! the delta bookkeeping testable without an on-chain runtime.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::pox::cycles::CycleSchedule;

/// Delegation state relevant to a lock decision.
#[derive(Clone, Debug)]
pub struct DelegationSnapshot {
    pub amount_ustx: u128,
    pub delegated_to: Pubkey,
    pub until_burn_height: Option<u64>,
    pub active: bool,
}

/// Current lock state of the user, if any.
#[derive(Clone, Copy, Debug)]
pub struct LockSnapshot {
    pub locked_amount: u128,
    pub unlock_burn_height: u64,
    pub first_reward_cycle: u64,
}

/// Inputs to a single lock decision.
#[derive(Clone, Debug)]
pub struct LockRequest<'a> {
    /// Pool operator performing the lock.
    pub pool: Pubkey,
    pub delegation: Option<&'a DelegationSnapshot>,
    pub current_lock: Option<&'a LockSnapshot>,
    pub requested_ustx: u128,
    /// Unlocked balance of the user account, in µSTX.
    pub available_ustx: u128,
    pub start_burn_height: u64,
    pub burn_height: u64,
}

/// What kind of mutation the plan performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockAction {
    /// Fresh lock for the upcoming cycle.
    Initial,
    /// Same-cycle re-lock; only `delta_ustx` is added to the accumulators.
    TopUp,
    /// One more cycle appended to an expiring lock.
    Extend,
}

/// The state delta a successful lock decision produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockPlan {
    pub action: LockAction,
    /// Total amount locked after applying the plan.
    pub lock_amount: u128,
    pub unlock_burn_height: u64,
    /// Cycle whose accumulators receive `delta_ustx`.
    pub target_cycle: u64,
    /// Increment for the partial-stack and pool-total accumulators. Zero for
    /// an idempotent re-lock.
    pub delta_ustx: u128,
}

fn clamped_amount(
    requested: u128,
    delegated: u128,
    available: u128,
    buffer: u128,
) -> Result<u128> {
    let amount = requested
        .min(delegated)
        .min(available)
        .saturating_sub(buffer);
    require!(amount > 0, ErrorCode::NonPositiveAmount);
    Ok(amount)
}

fn check_delegation_expiry(until: Option<u64>, unlock_burn_height: u64) -> Result<()> {
    if let Some(until) = until {
        require!(until >= unlock_burn_height, ErrorCode::PermissionDenied);
    }
    Ok(())
}

/// Decide how (and whether) `req.pool` may lock for the user.
///
/// `stx_buffer` is the configured non-stackable reserve and `lock_period`
/// the pool's lock length in cycles (1 in the common case).
pub fn plan_lock(
    req: &LockRequest,
    sched: &CycleSchedule,
    stx_buffer: u128,
    lock_period: u64,
) -> Result<LockPlan> {
    let delegation = req.delegation.ok_or(ErrorCode::NotFound)?;
    require!(
        delegation.active && delegation.delegated_to == req.pool,
        ErrorCode::NotFound
    );
    require!(req.requested_ustx > 0, ErrorCode::NonPositiveAmount);
    require!(
        req.requested_ustx <= delegation.amount_ustx,
        ErrorCode::PermissionDenied
    );

    let current_cycle = sched.cycle_of(req.burn_height);
    let next_cycle = current_cycle + 1;
    let next_cycle_start = sched.start_of(next_cycle);

    let active_lock = req
        .current_lock
        .filter(|lock| lock.unlock_burn_height > req.burn_height);

    if let Some(lock) = active_lock {
        if lock.first_reward_cycle == next_cycle && req.burn_height < next_cycle_start {
            // The lock was booked earlier this cycle and has not started yet:
            // a re-lock may only raise the amount. Re-locking without an
            // increase is just stacking again.
            let amount = clamped_amount(
                req.requested_ustx,
                delegation.amount_ustx,
                req.available_ustx,
                stx_buffer,
            )?;
            check_delegation_expiry(delegation.until_burn_height, lock.unlock_burn_height)?;
            let delta = amount.saturating_sub(lock.locked_amount);
            require!(delta > 0, ErrorCode::AlreadyStacking);
            return Ok(LockPlan {
                action: LockAction::TopUp,
                lock_amount: lock.locked_amount + delta,
                unlock_burn_height: lock.unlock_burn_height,
                target_cycle: lock.first_reward_cycle,
                delta_ustx: delta,
            });
        }

        if lock.unlock_burn_height > next_cycle_start {
            return err!(ErrorCode::AlreadyStacking);
        }

        // Lock ends exactly at the next cycle boundary: extension territory.
        require!(sched.in_extend_window(req.burn_height), ErrorCode::TooEarly);
        let target_cycle = sched.cycle_of(lock.unlock_burn_height);
        let unlock_burn_height = sched.unlock_height(target_cycle, lock_period);
        check_delegation_expiry(delegation.until_burn_height, unlock_burn_height)?;
        return Ok(LockPlan {
            action: LockAction::Extend,
            lock_amount: lock.locked_amount,
            unlock_burn_height,
            target_cycle,
            delta_ustx: lock.locked_amount,
        });
    }

    // Fresh lock. The start height must name the running cycle so the lock
    // becomes active with the next one.
    require!(
        sched.cycle_of(req.start_burn_height) == current_cycle,
        ErrorCode::InvalidStartBurnHeight
    );
    let amount = clamped_amount(
        req.requested_ustx,
        delegation.amount_ustx,
        req.available_ustx,
        stx_buffer,
    )?;
    let unlock_burn_height = sched.unlock_height(next_cycle, lock_period);
    check_delegation_expiry(delegation.until_burn_height, unlock_burn_height)?;
    Ok(LockPlan {
        action: LockAction::Initial,
        lock_amount: amount,
        unlock_burn_height,
        target_cycle: next_cycle,
        delta_ustx: amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: u64 = 1050;
    const HALF: u64 = CYCLE / 2;
    const STX: u128 = 1_000_000;

    fn sched() -> CycleSchedule {
        CycleSchedule::new(0, CYCLE)
    }

    fn pool() -> Pubkey {
        Pubkey::new_from_array([1u8; 32])
    }

    fn delegation(amount: u128) -> DelegationSnapshot {
        DelegationSnapshot {
            amount_ustx: amount,
            delegated_to: pool(),
            until_burn_height: None,
            active: true,
        }
    }

    fn request<'a>(
        delegation: Option<&'a DelegationSnapshot>,
        lock: Option<&'a LockSnapshot>,
        requested: u128,
        available: u128,
        burn_height: u64,
    ) -> LockRequest<'a> {
        LockRequest {
            pool: pool(),
            delegation,
            current_lock: lock,
            requested_ustx: requested,
            available_ustx: available,
            start_burn_height: burn_height,
            burn_height,
        }
    }

    fn expect_err(result: Result<LockPlan>, expected: ErrorCode) {
        assert_eq!(result.unwrap_err(), expected.into());
    }

    #[test]
    fn rejects_missing_or_foreign_delegation() {
        let s = sched();
        expect_err(
            plan_lock(&request(None, None, STX, STX, 40), &s, 0, 1),
            ErrorCode::NotFound,
        );

        let mut d = delegation(STX);
        d.delegated_to = Pubkey::new_from_array([9u8; 32]);
        expect_err(
            plan_lock(&request(Some(&d), None, STX, STX, 40), &s, 0, 1),
            ErrorCode::NotFound,
        );

        let mut revoked = delegation(STX);
        revoked.active = false;
        expect_err(
            plan_lock(&request(Some(&revoked), None, STX, STX, 40), &s, 0, 1),
            ErrorCode::NotFound,
        );
    }

    #[test]
    fn rejects_amount_over_delegation_cap() {
        let d = delegation(STX);
        expect_err(
            plan_lock(&request(Some(&d), None, 2 * STX, 10 * STX, 40), &sched(), 0, 1),
            ErrorCode::PermissionDenied,
        );
    }

    #[test]
    fn rejects_expired_delegation() {
        let mut d = delegation(10 * STX);
        // Delegation ends before the computed unlock height of 2100.
        d.until_burn_height = Some(2 * CYCLE - 1);
        expect_err(
            plan_lock(&request(Some(&d), None, STX, 10 * STX, 40), &sched(), 0, 1),
            ErrorCode::PermissionDenied,
        );

        d.until_burn_height = Some(2 * CYCLE);
        assert!(plan_lock(&request(Some(&d), None, STX, 10 * STX, 40), &sched(), 0, 1).is_ok());
    }

    #[test]
    fn clamps_to_balance_and_rejects_zero() {
        let d = delegation(STX);
        let plan = plan_lock(
            &request(Some(&d), None, STX, 500_000, 40),
            &sched(),
            0,
            1,
        )
        .unwrap();
        assert_eq!(plan.lock_amount, 500_000);

        expect_err(
            plan_lock(&request(Some(&d), None, STX, 0, 40), &sched(), 0, 1),
            ErrorCode::NonPositiveAmount,
        );
        expect_err(
            plan_lock(&request(Some(&d), None, 0, STX, 40), &sched(), 0, 1),
            ErrorCode::NonPositiveAmount,
        );
    }

    #[test]
    fn buffer_is_reserved_from_the_lockable_amount() {
        let d = delegation(20_000_000_000_100);
        let plan = plan_lock(
            &request(Some(&d), None, 20_000_000_000_100, 100_000_000 * STX, 40),
            &sched(),
            STX,
            1,
        )
        .unwrap();
        assert_eq!(plan.lock_amount, 19_999_999_000_100);
        assert_eq!(plan.unlock_burn_height, 2 * CYCLE);
        assert_eq!(plan.target_cycle, 1);
        assert_eq!(plan.action, LockAction::Initial);

        // The buffer can consume the whole clamped amount.
        let small = delegation(STX);
        expect_err(
            plan_lock(
                &request(Some(&small), None, STX, 10 * STX, 40),
                &sched(),
                STX,
                1,
            ),
            ErrorCode::NonPositiveAmount,
        );
    }

    #[test]
    fn rejects_stale_start_burn_height() {
        let d = delegation(10 * STX);
        // Height is in cycle 1 but the start height names cycle 0.
        let mut req = request(Some(&d), None, STX, 10 * STX, CYCLE + 5);
        req.start_burn_height = 40;
        expect_err(plan_lock(&req, &sched(), 0, 1), ErrorCode::InvalidStartBurnHeight);
    }

    #[test]
    fn fresh_lock_after_expiry_targets_the_next_cycle() {
        let d = delegation(10 * STX);
        let expired = LockSnapshot {
            locked_amount: STX,
            unlock_burn_height: 2 * CYCLE,
            first_reward_cycle: 1,
        };
        let h = 2 * CYCLE + 10;
        let plan = plan_lock(
            &request(Some(&d), Some(&expired), 2 * STX, 10 * STX, h),
            &sched(),
            0,
            1,
        )
        .unwrap();
        assert_eq!(plan.action, LockAction::Initial);
        assert_eq!(plan.target_cycle, 3);
        assert_eq!(plan.unlock_burn_height, 4 * CYCLE);
    }

    #[test]
    fn top_up_books_only_the_delta() {
        let d = delegation(20 * STX);
        let lock = LockSnapshot {
            locked_amount: STX,
            unlock_burn_height: 2 * CYCLE,
            first_reward_cycle: 1,
        };
        let plan = plan_lock(
            &request(Some(&d), Some(&lock), 10 * STX, 100 * STX, CYCLE - 5),
            &sched(),
            0,
            1,
        )
        .unwrap();
        assert_eq!(plan.action, LockAction::TopUp);
        assert_eq!(plan.lock_amount, 10 * STX);
        assert_eq!(plan.delta_ustx, 9 * STX);
        assert_eq!(plan.unlock_burn_height, 2 * CYCLE);
        assert_eq!(plan.target_cycle, 1);
    }

    #[test]
    fn re_lock_without_an_increase_is_already_stacking() {
        let d = delegation(20 * STX);
        let lock = LockSnapshot {
            locked_amount: 10 * STX,
            unlock_burn_height: 2 * CYCLE,
            first_reward_cycle: 1,
        };
        expect_err(
            plan_lock(
                &request(Some(&d), Some(&lock), 10 * STX, 100 * STX, CYCLE - 5),
                &sched(),
                0,
                1,
            ),
            ErrorCode::AlreadyStacking,
        );

        // A smaller re-lock never shrinks the position either.
        expect_err(
            plan_lock(
                &request(Some(&d), Some(&lock), 2 * STX, 100 * STX, CYCLE - 5),
                &sched(),
                0,
                1,
            ),
            ErrorCode::AlreadyStacking,
        );
    }

    #[test]
    fn already_stacking_when_the_lock_covers_the_next_cycle() {
        let d = delegation(20 * STX);

        // Auto-locked for cycle 3 earlier in cycle 2; nothing to add.
        let upcoming = LockSnapshot {
            locked_amount: STX,
            unlock_burn_height: 4 * CYCLE,
            first_reward_cycle: 3,
        };
        let h = 2 * CYCLE + HALF + 5;
        expect_err(
            plan_lock(
                &request(Some(&d), Some(&upcoming), STX, 100 * STX, h),
                &sched(),
                0,
                1,
            ),
            ErrorCode::AlreadyStacking,
        );

        // A multi-cycle lock running past the next boundary cannot be
        // extended or re-locked mid-way.
        let multi_cycle = LockSnapshot {
            locked_amount: STX,
            unlock_burn_height: 4 * CYCLE,
            first_reward_cycle: 2,
        };
        expect_err(
            plan_lock(
                &request(Some(&d), Some(&multi_cycle), STX, 100 * STX, h),
                &sched(),
                0,
                1,
            ),
            ErrorCode::AlreadyStacking,
        );
    }

    #[test]
    fn extend_respects_the_half_cycle_window() {
        let d = delegation(2 * STX);
        let lock = LockSnapshot {
            locked_amount: STX,
            unlock_burn_height: 2 * CYCLE,
            first_reward_cycle: 1,
        };

        let too_early = CYCLE + HALF - 1;
        expect_err(
            plan_lock(
                &request(Some(&d), Some(&lock), STX, 100 * STX, too_early),
                &sched(),
                0,
                1,
            ),
            ErrorCode::TooEarly,
        );

        let plan = plan_lock(
            &request(Some(&d), Some(&lock), STX, 100 * STX, CYCLE + HALF),
            &sched(),
            0,
            1,
        )
        .unwrap();
        assert_eq!(plan.action, LockAction::Extend);
        assert_eq!(plan.lock_amount, STX);
        assert_eq!(plan.delta_ustx, STX);
        assert_eq!(plan.target_cycle, 2);
        assert_eq!(plan.unlock_burn_height, 3 * CYCLE);
    }
}
