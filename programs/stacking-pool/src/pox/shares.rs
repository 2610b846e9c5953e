//! Reward share arithmetic.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;

mod u256 {
    uint::construct_uint! {
        pub struct U256(4);
    }
}
pub use u256::U256;

/// Proportional share of `reward_pool_ustx` owed to a position of
/// `user_ustx` out of `total_ustx`. Integer division truncates toward zero;
/// a share is never rounded up, so the sum of all shares never exceeds the
/// pool. A zero total yields a zero share.
pub fn calculate_share(user_ustx: u128, total_ustx: u128, reward_pool_ustx: u128) -> u128 {
    if total_ustx == 0 {
        return 0;
    }
    let share = U256::from(reward_pool_ustx) * U256::from(user_ustx) / U256::from(total_ustx);
    if share > U256::from(u128::MAX) {
        u128::MAX
    } else {
        share.as_u128()
    }
}

/// Shares for one `distribute-rewards-many` call.
///
/// `positions` holds `(locked_amount, already_paid)` per listed user. The
/// remaining deposit must cover the recomputed shares of *all* listed users,
/// paid or not; only then are the unpaid ones actually booked.
pub fn plan_distribution(
    positions: &[(u128, bool)],
    total_ustx: u128,
    deposited_ustx: u128,
    remaining_ustx: u128,
) -> Result<Vec<u128>> {
    let mut required: u128 = 0;
    let mut shares = Vec::with_capacity(positions.len());
    for (locked, _) in positions {
        let share = calculate_share(*locked, total_ustx, deposited_ustx);
        required = required.checked_add(share).ok_or(ErrorCode::Overflow)?;
        shares.push(share);
    }
    require!(required <= remaining_ustx, ErrorCode::InsufficientFunds);
    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_percent_share() {
        assert_eq!(calculate_share(100, 1_000_000, 100_000_000), 1);
    }

    #[test]
    fn shares_round_down_never_up() {
        assert_eq!(calculate_share(100, 3_333_333, 100_000_000), 3);
        assert_eq!(calculate_share(100, 3_888_888, 100_000_000), 3);
        assert_eq!(calculate_share(100, 888_888, 100_000_000), 0);
    }

    #[test]
    fn zero_total_yields_zero() {
        assert_eq!(calculate_share(100, 0, 100_000_000), 0);
    }

    #[test]
    fn full_position_takes_the_whole_pool() {
        assert_eq!(calculate_share(42, 42, 1_000), 1_000);
    }

    #[test]
    fn distribution_requires_cover_for_every_listed_user() {
        let positions = [(3_333_333, false), (6_666_667, false)];
        let shares = plan_distribution(&positions, 10_000_000, 1_000, 1_000).unwrap();
        assert_eq!(shares, vec![333, 666]);

        // Re-distribution against the leftover dust fails even though both
        // users were already paid.
        let paid = [(3_333_333, true), (6_666_667, true)];
        let result = plan_distribution(&paid, 10_000_000, 1_000, 1);
        assert_eq!(result.unwrap_err(), ErrorCode::InsufficientFunds.into());
    }

    proptest! {
        #[test]
        fn share_sum_never_exceeds_pool(
            amounts in proptest::collection::vec(0u128..=10_000_000_000_000, 1..8),
            pool in 0u128..=100_000_000_000_000,
        ) {
            let total: u128 = amounts.iter().sum();
            let sum: u128 = amounts
                .iter()
                .map(|a| calculate_share(*a, total, pool))
                .sum();
            prop_assert!(sum <= pool);
        }

        #[test]
        fn share_is_monotone_in_the_position(
            a in 0u128..=1_000_000_000_000,
            b in 0u128..=1_000_000_000_000,
            pool in 0u128..=100_000_000_000_000,
        ) {
            let total = a + b;
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                calculate_share(small, total, pool) <= calculate_share(large, total, pool)
            );
        }
    }
}
