//! Execution-time accounting and CPU load estimation
//!
//! Every task stamps the reference timer when it starts and finishes a
//! release. The difference is added to the task's lifetime total and to a
//! shared window sum. The idle context turns the window sum into a load
//! percentage and clears it; lifetime totals are never cleared.
//!
//! Writers and the reader never race on a single core: a task slot is
//! written only by its task and the idle path runs only when no task is
//! runnable. All fields are still atomics, so the monitor is `Sync` and
//! can sit in a `static`. On a multi-core part the window sum would need
//! the same care as any other shared counter; `fetch_add` covers the
//! writers, the read-and-clear in [`PerfMonitor::sample`] is a `swap`.

use portable_atomic::{AtomicU32, Ordering};

use crate::port::ReferenceTimer;
use crate::types::{TaskId, TimerCount};

const CONTEXTS: usize = TaskId::ALL.len();

/// Timing record of one context
struct TaskTime {
    in_time: AtomicU32,
    total_time: AtomicU32,
    overruns: AtomicU32,
}

impl TaskTime {
    const fn new() -> Self {
        TaskTime {
            in_time: AtomicU32::new(0),
            total_time: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }
}

/// Per-task busy time and CPU load estimate
pub struct PerfMonitor {
    task_time: [TaskTime; CONTEXTS],
    /// Busy counts accumulated since the last sample
    window: AtomicU32,
    /// Reference count at the last sample
    last_sample: AtomicU32,
    cpu_load: AtomicU32,
    samples: AtomicU32,
}

impl PerfMonitor {
    pub const fn new() -> Self {
        PerfMonitor {
            task_time: [
                TaskTime::new(),
                TaskTime::new(),
                TaskTime::new(),
                TaskTime::new(),
                TaskTime::new(),
                TaskTime::new(),
                TaskTime::new(),
            ],
            window: AtomicU32::new(0),
            last_sample: AtomicU32::new(0),
            cpu_load: AtomicU32::new(0),
            samples: AtomicU32::new(0),
        }
    }

    /// Anchor the first measurement window at `timer`'s current count
    pub fn start<R: ReferenceTimer>(&self, timer: &R) {
        self.last_sample.store(timer.count(), Ordering::Relaxed);
        self.window.store(0, Ordering::Relaxed);
    }

    /// Record the entry timestamp of `id`
    #[inline]
    pub fn task_enter(&self, id: TaskId, now: TimerCount) {
        self.task_time[id.index()].in_time.store(now, Ordering::Relaxed);
    }

    /// Close the interval opened by [`PerfMonitor::task_enter`]
    ///
    /// Returns the busy counts of this interval.
    pub fn task_exit(&self, id: TaskId, now: TimerCount) -> TimerCount {
        let slot = &self.task_time[id.index()];
        let busy = now.wrapping_sub(slot.in_time.load(Ordering::Relaxed));
        slot.total_time.fetch_add(busy, Ordering::Relaxed);
        self.window.fetch_add(busy, Ordering::Relaxed);
        busy
    }

    /// Count releases of `id` lost to an overrun
    pub fn note_overrun(&self, id: TaskId, skipped: u32) {
        self.task_time[id.index()]
            .overruns
            .fetch_add(skipped, Ordering::Relaxed);
    }

    /// Recompute the CPU load; call from the idle context only
    ///
    /// load = window sum * 100 / counts elapsed since the previous sample.
    /// A zero-length window keeps the previous estimate.
    pub fn sample(&self, now: TimerCount) -> u32 {
        let last = self.last_sample.load(Ordering::Relaxed);
        let elapsed = now.wrapping_sub(last);
        if elapsed == 0 {
            return self.cpu_load();
        }

        let busy = self.window.swap(0, Ordering::Relaxed);
        let load = ((busy as u64 * 100) / elapsed as u64) as u32;

        self.last_sample.store(now, Ordering::Relaxed);
        self.cpu_load.store(load, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Relaxed);

        crate::trace!("cpu load {}% ({} / {})", load, busy, elapsed);
        load
    }

    /// Latest load estimate in percent
    #[inline]
    pub fn cpu_load(&self) -> u32 {
        self.cpu_load.load(Ordering::Relaxed)
    }

    /// Busy counts of `id` since start-up
    #[inline]
    pub fn task_total(&self, id: TaskId) -> TimerCount {
        self.task_time[id.index()].total_time.load(Ordering::Relaxed)
    }

    /// Releases of `id` skipped because it was still running
    #[inline]
    pub fn overruns(&self, id: TaskId) -> u32 {
        self.task_time[id.index()].overruns.load(Ordering::Relaxed)
    }

    /// Busy counts accumulated in the open window
    #[inline]
    pub fn window(&self) -> TimerCount {
        self.window.load(Ordering::Relaxed)
    }

    /// Number of load samples taken so far
    #[inline]
    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }
}

impl Default for PerfMonitor {
    fn default() -> Self {
        Self::new()
    }
}
