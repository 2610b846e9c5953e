//! Reward-cycle arithmetic.
//!
//! All heights are burn-chain heights. A cycle `c` spans
//! `[start_of(c), start_of(c + 1))`; a lock whose unlock height equals
//! `start_of(c)` is therefore *not* locked for cycle `c`.

/// Cycle geometry of the base protocol, captured at pool initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleSchedule {
    pub first_burn_height: u64,
    pub cycle_length: u64,
}

impl CycleSchedule {
    pub const fn new(first_burn_height: u64, cycle_length: u64) -> Self {
        CycleSchedule {
            first_burn_height,
            cycle_length,
        }
    }

    /// Reward cycle containing `burn_height`. Heights before the first burn
    /// height count as cycle 0.
    pub fn cycle_of(&self, burn_height: u64) -> u64 {
        burn_height.saturating_sub(self.first_burn_height) / self.cycle_length
    }

    /// First burn height of `cycle`.
    pub fn start_of(&self, cycle: u64) -> u64 {
        self.first_burn_height + cycle * self.cycle_length
    }

    /// Midpoint of `cycle`; the extension window opens here.
    pub fn half_point_of(&self, cycle: u64) -> u64 {
        self.start_of(cycle) + self.cycle_length / 2
    }

    /// Whether `burn_height` has passed the halfway point of its own cycle,
    /// i.e. whether extensions into the next cycle are allowed.
    pub fn in_extend_window(&self, burn_height: u64) -> bool {
        burn_height >= self.half_point_of(self.cycle_of(burn_height))
    }

    /// Unlock height of a lock whose first active cycle is `first_cycle`
    /// and which stays locked for `period` cycles.
    pub fn unlock_height(&self, first_cycle: u64, period: u64) -> u64 {
        self.start_of(first_cycle + period)
    }

    /// True when a position with the given unlock height is fully unlocked
    /// by the time `cycle` begins. Inclusive at the exact start height.
    pub fn not_locked_for_cycle(&self, unlock_burn_height: u64, cycle: u64) -> bool {
        unlock_burn_height <= self.start_of(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: u64 = 1050;

    fn sched() -> CycleSchedule {
        CycleSchedule::new(0, CYCLE)
    }

    #[test]
    fn cycle_boundaries() {
        let s = sched();
        assert_eq!(s.cycle_of(0), 0);
        assert_eq!(s.cycle_of(CYCLE - 1), 0);
        assert_eq!(s.cycle_of(CYCLE), 1);
        assert_eq!(s.start_of(2), 2 * CYCLE);
        assert_eq!(s.unlock_height(1, 1), 2 * CYCLE);
        assert_eq!(s.unlock_height(3, 1), 4 * CYCLE);
    }

    #[test]
    fn unlock_height_checks() {
        let s = sched();
        assert!(s.not_locked_for_cycle(10, 1));
        assert!(s.not_locked_for_cycle(1050, 1));
        assert!(!s.not_locked_for_cycle(1051, 1));
        assert!(!s.not_locked_for_cycle(2100, 1));
        assert!(s.not_locked_for_cycle(2100, 2));
        assert!(!s.not_locked_for_cycle(2101, 2));
    }

    #[test]
    fn extend_window_opens_at_half_cycle() {
        let s = sched();
        let half = CYCLE / 2;
        assert!(!s.in_extend_window(CYCLE + half - 1));
        assert!(s.in_extend_window(CYCLE + half));
        assert!(s.in_extend_window(CYCLE + CYCLE - 1));
        assert!(!s.in_extend_window(2 * CYCLE));
    }

    #[test]
    fn offset_first_burn_height() {
        let s = CycleSchedule::new(100, CYCLE);
        assert_eq!(s.cycle_of(99), 0);
        assert_eq!(s.cycle_of(100 + CYCLE), 1);
        assert_eq!(s.start_of(1), 100 + CYCLE);
    }
}
