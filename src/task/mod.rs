//! Periodic task management
//!
//! A periodic task is released at `t0`, `t0 + P`, `t0 + 2P`, ... and must
//! finish each release before the next one (deadline = period). The
//! [`PeriodicRunner`] owns the release bookkeeping: it instruments the
//! task body, computes the next absolute release from the previous
//! *scheduled* release, and parks the task on the kernel until then.
//!
//! A release that runs past one or more boundaries loses them: the runner
//! resumes at the first boundary still in the future, never replays the
//! missed ones.

pub mod button;
pub mod load;
pub mod receiver;
pub mod transmitter;

pub use button::{classify, Button, ButtonMonitor, EdgeDetector};
pub use load::LoadSimulation;
pub use receiver::UartReceiver;
pub use transmitter::PeriodicTransmitter;

use crate::config::{task_params, TaskParams};
use crate::instrument::Instrumentation;
use crate::port::{GpioPort, Kernel, ReferenceTimer};
use crate::time::{next_release, ReleaseSlot};
use crate::types::{OsTick, TaskId};

/// Body of a periodic task
///
/// `release` does one cycle of work and returns; it must not loop or wait
/// for its own next release.
pub trait PeriodicTask {
    fn id(&self) -> TaskId;

    /// Simulated execution budget in units (zero for real work)
    fn budget(&self) -> u32 {
        0
    }

    fn release(&mut self);
}

/// Release bookkeeping of one task, owned by its runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    id: TaskId,
    period: OsTick,
    budget: u32,
    last_release: OsTick,
    releases: u32,
    missed: u32,
}

impl TaskDescriptor {
    /// Describe a task whose first release is at `start`
    pub fn new(id: TaskId, period: OsTick, budget: u32, start: OsTick) -> Self {
        TaskDescriptor {
            id,
            period,
            budget,
            last_release: start,
            releases: 0,
            missed: 0,
        }
    }

    pub fn from_params(params: &TaskParams, start: OsTick) -> Self {
        Self::new(params.id, params.period, params.budget, start)
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn period(&self) -> OsTick {
        self.period
    }

    /// Relative deadline, always equal to the period
    #[inline]
    pub fn deadline(&self) -> OsTick {
        self.period
    }

    #[inline]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Scheduled tick of the pending (or current) release
    #[inline]
    pub fn last_release(&self) -> OsTick {
        self.last_release
    }

    /// Completed releases
    #[inline]
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Releases lost to overruns
    #[inline]
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Close the current release finished at `now` and pick the next one
    ///
    /// A finish before the scheduled release (a `start` still in the
    /// future) keeps that release pending.
    pub fn advance(&mut self, now: OsTick) -> ReleaseSlot {
        let slot = next_release(self.last_release, self.period, now);
        self.last_release = slot.wake;
        self.releases = self.releases.wrapping_add(1);
        self.missed = self.missed.wrapping_add(slot.skipped);
        slot
    }
}

/// Outcome of one release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Release {
    pub id: TaskId,
    /// Scheduled release tick
    pub released_at: OsTick,
    /// Tick at which the work finished
    pub finished_at: OsTick,
    /// Busy reference counts spent in the release
    pub busy: u32,
    /// Next scheduled release
    pub wake: OsTick,
    /// Boundaries skipped because the release overran
    pub skipped: u32,
}

/// Something a single-core driver can release
///
/// Implemented by [`PeriodicRunner`]; lets a driver hold runners of
/// different task types side by side.
pub trait Schedulable {
    fn id(&self) -> TaskId;

    fn period(&self) -> OsTick;

    /// Tick at which the task next becomes runnable
    fn next_release(&self) -> OsTick;

    /// Run one release without parking
    fn step(&mut self) -> Release;
}

/// Binds a task body to the kernel and the instrumentation
pub struct PeriodicRunner<'a, T, K, G, R>
where
    T: PeriodicTask,
    K: Kernel,
    G: GpioPort,
    R: ReferenceTimer,
{
    desc: TaskDescriptor,
    task: T,
    kernel: &'a K,
    instr: &'a Instrumentation<'a, G, R>,
}

impl<'a, T, K, G, R> PeriodicRunner<'a, T, K, G, R>
where
    T: PeriodicTask,
    K: Kernel,
    G: GpioPort,
    R: ReferenceTimer,
{
    /// Create a runner whose first release is the current tick
    pub fn new(task: T, period: OsTick, kernel: &'a K, instr: &'a Instrumentation<'a, G, R>) -> Self {
        let desc = TaskDescriptor::new(task.id(), period, task.budget(), kernel.tick_count());
        PeriodicRunner {
            desc,
            task,
            kernel,
            instr,
        }
    }

    /// Create a runner with the period configured in the task table
    ///
    /// Returns `None` for a task that has no table entry (the idle context).
    pub fn from_table(task: T, kernel: &'a K, instr: &'a Instrumentation<'a, G, R>) -> Option<Self> {
        let params = task_params(task.id())?;
        Some(Self::new(task, params.period, kernel, instr))
    }

    #[inline]
    pub fn descriptor(&self) -> &TaskDescriptor {
        &self.desc
    }

    #[inline]
    pub fn task(&self) -> &T {
        &self.task
    }

    /// Run one instrumented release and compute the next one
    ///
    /// Does not park; [`PeriodicRunner::run`] pairs it with
    /// [`Kernel::delay_until`].
    pub fn step(&mut self) -> Release {
        let id = self.desc.id();
        let released_at = self.desc.last_release();

        self.instr.enter(id);
        self.task.release();
        let busy = self.instr.exit(id);

        let finished_at = self.kernel.tick_count();
        let slot = self.desc.advance(finished_at);
        if slot.missed_deadline() {
            self.instr.perf().note_overrun(id, slot.skipped);
            crate::warn!(
                "task {} overran: finished at {}, skipped {} release(s)",
                id.index() as u8,
                finished_at,
                slot.skipped
            );
        }

        Release {
            id,
            released_at,
            finished_at,
            busy,
            wake: slot.wake,
            skipped: slot.skipped,
        }
    }

    /// Run a bounded number of releases, parking between them
    pub fn run_for(&mut self, releases: u32) {
        for _ in 0..releases {
            let release = self.step();
            self.kernel.delay_until(release.wake);
        }
    }

    /// Task entry point: release forever
    pub fn run(mut self) -> ! {
        crate::info!("task {} started", self.desc.id().index() as u8);
        loop {
            let release = self.step();
            self.kernel.delay_until(release.wake);
        }
    }
}

impl<'a, T, K, G, R> Schedulable for PeriodicRunner<'a, T, K, G, R>
where
    T: PeriodicTask,
    K: Kernel,
    G: GpioPort,
    R: ReferenceTimer,
{
    fn id(&self) -> TaskId {
        self.desc.id()
    }

    fn period(&self) -> OsTick {
        self.desc.period()
    }

    fn next_release(&self) -> OsTick {
        self.desc.last_release()
    }

    fn step(&mut self) -> Release {
        PeriodicRunner::step(self)
    }
}
