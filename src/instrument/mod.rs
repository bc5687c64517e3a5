//! Timing instrumentation
//!
//! Pin tracing, busy-time accounting and the simulated workload used to
//! probe schedulability.

pub mod budget;
pub mod perf;
pub mod trace;

pub use budget::{ExecutionBudget, SpinBudget};
pub use perf::PerfMonitor;
pub use trace::{trace_line, Tracer, TRACE_MAP};

use crate::port::{GpioPort, ReferenceTimer};
use crate::types::{OsTick, TaskId};

/// Tracer, monitor and reference timer wired together
///
/// Task bodies call [`Instrumentation::enter`] / [`Instrumentation::exit`]
/// around each release; the kernel's hooks call
/// [`Instrumentation::idle_hook`] and [`Instrumentation::tick_hook`].
pub struct Instrumentation<'a, G: GpioPort, R: ReferenceTimer> {
    tracer: Tracer<'a, G>,
    perf: &'a PerfMonitor,
    timer: &'a R,
}

impl<'a, G: GpioPort, R: ReferenceTimer> Instrumentation<'a, G, R> {
    /// Bundle the collaborators and open the first load window
    pub fn new(gpio: &'a G, perf: &'a PerfMonitor, timer: &'a R) -> Self {
        perf.start(timer);
        Instrumentation {
            tracer: Tracer::new(gpio),
            perf,
            timer,
        }
    }

    #[inline]
    pub fn tracer(&self) -> &Tracer<'a, G> {
        &self.tracer
    }

    #[inline]
    pub fn perf(&self) -> &'a PerfMonitor {
        self.perf
    }

    #[inline]
    pub fn timer(&self) -> &'a R {
        self.timer
    }

    /// Start of a release: leave idle, raise the task line, stamp entry
    pub fn enter(&self, id: TaskId) {
        self.tracer.mark_exit(TaskId::Idle);
        self.tracer.mark_enter(id);
        self.perf.task_enter(id, self.timer.count());
    }

    /// End of a release: stamp exit, lower the task line
    ///
    /// Returns the busy counts of the release.
    pub fn exit(&self, id: TaskId) -> u32 {
        let busy = self.perf.task_exit(id, self.timer.count());
        self.tracer.mark_exit(id);
        busy
    }

    /// Idle hook: raise the idle line and take a load sample
    pub fn idle_hook(&self) -> u32 {
        self.tracer.mark_enter(TaskId::Idle);
        self.perf.sample(self.timer.count())
    }

    /// Tick hook: pulse the tick probe
    pub fn tick_hook(&self, tick: OsTick) {
        self.tracer.mark_tick();
        crate::log::set_log_tick(tick);
    }
}
