//! Execution-time budgeter
//!
//! Burns an approximately fixed amount of CPU per requested unit. Used by
//! the load generators to occupy the processor for a chosen fraction of
//! their period. Precision depends on the compiler and optimisation level;
//! only the ordering of durations for different unit counts is reliable.

use crate::config::ET_TO_COUNT_MAP;
use crate::port::ReferenceTimer;
use crate::types::TimerCount;

/// Source of simulated execution time
pub trait ExecutionBudget {
    /// Occupy the caller for roughly `units` budget units
    fn consume(&self, units: u32);
}

/// Calibrated busy loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinBudget {
    counts_per_unit: u32,
}

impl SpinBudget {
    pub const fn new(counts_per_unit: u32) -> Self {
        SpinBudget { counts_per_unit }
    }

    /// Loop iterations per unit
    #[inline]
    pub fn counts_per_unit(&self) -> u32 {
        self.counts_per_unit
    }

    /// Measure how many iterations cover `unit_counts` reference counts
    ///
    /// Runs a probe of `probe_iterations` loop passes and scales it. Falls
    /// back to the default mapping when the probe is too short to measure.
    pub fn calibrate<R: ReferenceTimer>(
        timer: &R,
        unit_counts: TimerCount,
        probe_iterations: u32,
    ) -> Self {
        let start = timer.count();
        spin(probe_iterations);
        let spent = timer.count().wrapping_sub(start);

        if spent == 0 || unit_counts == 0 {
            crate::warn!("budget calibration inconclusive, keeping default");
            return Self::default();
        }

        let per_unit = (probe_iterations as u64 * unit_counts as u64) / spent as u64;
        let per_unit = per_unit.clamp(1, u32::MAX as u64) as u32;
        crate::info!("budget calibrated to {} iterations per unit", per_unit);
        SpinBudget::new(per_unit)
    }
}

impl Default for SpinBudget {
    fn default() -> Self {
        SpinBudget::new(ET_TO_COUNT_MAP)
    }
}

impl ExecutionBudget for SpinBudget {
    fn consume(&self, units: u32) {
        spin(units.saturating_mul(self.counts_per_unit));
    }
}

/// Counting loop the optimiser cannot remove
#[inline(never)]
fn spin(iterations: u32) {
    let mut i: u32 = 0;
    while core::hint::black_box(i) < iterations {
        i = core::hint::black_box(i + 1);
    }
}
