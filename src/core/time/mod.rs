//! Time management module
//!
//! Wrap-safe tick arithmetic and the release-time rule of the periodic
//! runner. All comparisons treat the tick counter as a circular `u32`:
//! two instants are ordered correctly as long as they are less than half
//! the counter range apart.

use crate::types::OsTick;

/// Ticks elapsed from `since` to `now`, across counter wrap
#[inline(always)]
pub fn ticks_between(since: OsTick, now: OsTick) -> OsTick {
    now.wrapping_sub(since)
}

/// True when `now` is at or past `target`
#[inline(always)]
pub fn tick_reached(now: OsTick, target: OsTick) -> bool {
    (now.wrapping_sub(target) as i32) >= 0
}

/// True when `a` comes strictly before `b`
#[inline(always)]
pub fn tick_before(a: OsTick, b: OsTick) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

/// Next release chosen after a task finished its work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReleaseSlot {
    /// Absolute tick of the next release
    pub wake: OsTick,
    /// Nominal releases that passed while the task was still running
    pub skipped: u32,
}

impl ReleaseSlot {
    /// True when at least one release was lost to an overrun
    #[inline]
    pub fn missed_deadline(&self) -> bool {
        self.skipped > 0
    }
}

/// Compute the next absolute release of a periodic task
///
/// The result is the smallest boundary `last + k * period` (`k >= 1`)
/// strictly after `now`. Boundaries that already passed are dropped, never
/// replayed, so an overrun costs releases instead of causing a burst.
///
/// When `now` is still before `last` the pending release has not been
/// reached yet; it stays the next wake and nothing counts as skipped.
///
/// # Arguments
/// * `last` - Previous scheduled release (not the time the task woke up)
/// * `period` - Release period in ticks, must be non-zero
/// * `now` - Current tick, taken after the release work finished
pub fn next_release(last: OsTick, period: OsTick, now: OsTick) -> ReleaseSlot {
    debug_assert!(period > 0, "period must be non-zero");
    let period = period.max(1);

    if tick_before(now, last) {
        return ReleaseSlot {
            wake: last,
            skipped: 0,
        };
    }

    let elapsed = ticks_between(last, now);
    if elapsed < period {
        return ReleaseSlot {
            wake: last.wrapping_add(period),
            skipped: 0,
        };
    }

    let k = (elapsed / period).saturating_add(1);
    ReleaseSlot {
        wake: last.wrapping_add(k.wrapping_mul(period)),
        skipped: k - 1,
    }
}
