//! Host simulation port
//!
//! Deterministic collaborators for running the task set off-target: a
//! virtual tick clock, recorded GPIO, a captured byte sink, a reference
//! timer and execution budget derived from the virtual clock, and a
//! single-core earliest-deadline-first driver.
//!
//! Virtual time only moves when something asks it to: a task parking on
//! the kernel, a budget being consumed, or the driver idling until the
//! next release.

use heapless::Vec;
use portable_atomic::{AtomicU32, Ordering};

use crate::cs_cell::CsCell;
use crate::instrument::{ExecutionBudget, Instrumentation};
use crate::port::{ByteSink, GpioPort, Kernel, ReferenceTimer};
use crate::task::Schedulable;
use crate::time::{tick_before, tick_reached, ticks_between};
use crate::types::{Level, Line, OsTick, Port, TimerCount};

/// Pin writes remembered by [`SimGpio`]
pub const SIM_EVENT_CAPACITY: usize = 4096;

/// Bytes remembered by [`SimSink`]
pub const SIM_SINK_CAPACITY: usize = 4096;

// ============ Kernel ============

/// Virtual tick clock
pub struct SimKernel {
    now: AtomicU32,
}

impl SimKernel {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock whose first reading is `tick`
    pub const fn starting_at(tick: OsTick) -> Self {
        SimKernel {
            now: AtomicU32::new(tick),
        }
    }

    /// Move the clock forward by `ticks`
    pub fn advance(&self, ticks: OsTick) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }

    /// Move the clock to `tick` unless it is already past it
    pub fn advance_to(&self, tick: OsTick) {
        let now = self.now.load(Ordering::Relaxed);
        if tick_before(now, tick) {
            self.now.store(tick, Ordering::Relaxed);
        }
    }
}

impl Default for SimKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for SimKernel {
    fn tick_count(&self) -> OsTick {
        self.now.load(Ordering::Relaxed)
    }

    fn delay_until(&self, wake: OsTick) {
        self.advance_to(wake);
    }
}

// ============ GPIO ============

/// One recorded output write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub line: Line,
    pub level: Level,
}

/// Two 32-bit ports with a log of every write
pub struct SimGpio {
    ports: [AtomicU32; 2],
    events: CsCell<Vec<PinEvent, SIM_EVENT_CAPACITY>>,
    lost: AtomicU32,
}

impl SimGpio {
    pub const fn new() -> Self {
        SimGpio {
            ports: [AtomicU32::new(0), AtomicU32::new(0)],
            events: CsCell::new(Vec::new()),
            lost: AtomicU32::new(0),
        }
    }

    fn port(&self, port: Port) -> &AtomicU32 {
        &self.ports[port as usize]
    }

    /// Drive an input line from the outside world
    ///
    /// Does not enter the write log.
    pub fn set_input(&self, line: Line, level: Level) {
        match level {
            Level::High => self.port(line.port).fetch_or(line.mask(), Ordering::Relaxed),
            Level::Low => self.port(line.port).fetch_and(!line.mask(), Ordering::Relaxed),
        };
    }

    /// Current level of any line
    pub fn level(&self, line: Line) -> Level {
        Level::from_bool(self.port(line.port).load(Ordering::Relaxed) & line.mask() != 0)
    }

    /// Run `f` over the write log
    pub fn with_events<R>(&self, f: impl FnOnce(&[PinEvent]) -> R) -> R {
        self.events.read(|events| f(events))
    }

    /// Number of writes that raised `line`
    pub fn rising_writes(&self, line: Line) -> usize {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.line == line && e.level == Level::High)
                .count()
        })
    }

    /// Writes that did not fit into the log
    pub fn lost_events(&self) -> u32 {
        self.lost.load(Ordering::Relaxed)
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for SimGpio {
    fn read(&self, line: Line) -> Level {
        self.level(line)
    }

    fn write(&self, line: Line, level: Level) {
        self.set_input(line, level);
        let stored = self.events.with(|events| events.push(PinEvent { line, level }).is_ok());
        if !stored {
            self.lost.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ============ Output sink ============

/// Byte sink that keeps everything written to it
pub struct SimSink {
    bytes: CsCell<Vec<u8, SIM_SINK_CAPACITY>>,
}

impl SimSink {
    pub const fn new() -> Self {
        SimSink {
            bytes: CsCell::new(Vec::new()),
        }
    }

    /// Run `f` over the captured output
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.bytes.read(|bytes| f(bytes))
    }

    /// Number of complete lines written so far
    pub fn lines(&self) -> usize {
        self.with_bytes(|bytes| bytes.iter().filter(|&&b| b == b'\n').count())
    }
}

impl Default for SimSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink for SimSink {
    fn put_bytes(&self, bytes: &[u8]) {
        self.bytes.with(|buf| {
            let room = buf.capacity() - buf.len();
            let take = bytes.len().min(room);
            // Cannot fail: `take` is bounded by the free room
            let _ = buf.extend_from_slice(&bytes[..take]);
        });
    }
}

// ============ Timer and budget ============

/// Reference timer running `scale` counts per virtual tick
pub struct SimTimer<'a> {
    kernel: &'a SimKernel,
    scale: u32,
}

impl<'a> SimTimer<'a> {
    pub const fn new(kernel: &'a SimKernel, scale: u32) -> Self {
        SimTimer { kernel, scale }
    }
}

impl ReferenceTimer for SimTimer<'_> {
    fn count(&self) -> TimerCount {
        self.kernel.tick_count().wrapping_mul(self.scale)
    }
}

/// Budget that consumes virtual time instead of CPU cycles
pub struct SimBudget<'a> {
    kernel: &'a SimKernel,
    ticks_per_unit: OsTick,
}

impl<'a> SimBudget<'a> {
    pub const fn new(kernel: &'a SimKernel, ticks_per_unit: OsTick) -> Self {
        SimBudget { kernel, ticks_per_unit }
    }
}

impl ExecutionBudget for SimBudget<'_> {
    fn consume(&self, units: u32) {
        self.kernel.advance(units.saturating_mul(self.ticks_per_unit));
    }
}

// ============ Scheduler ============

/// Counters of one simulated run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimReport {
    /// Releases executed
    pub releases: u32,
    /// Times the processor went idle
    pub idle_entries: u32,
    /// Boundaries skipped by overrunning releases
    pub skipped: u32,
}

/// Single-core, non-preemptive earliest-deadline-first driver
///
/// Among the released tasks the one with the earliest absolute deadline
/// (release + period) runs first; ties go to the lower task identity.
/// When nothing is released the idle hook runs once and the clock jumps
/// to the next release.
pub struct SimScheduler<'a, G: GpioPort, R: ReferenceTimer> {
    kernel: &'a SimKernel,
    instr: &'a Instrumentation<'a, G, R>,
}

impl<'a, G: GpioPort, R: ReferenceTimer> SimScheduler<'a, G, R> {
    pub fn new(kernel: &'a SimKernel, instr: &'a Instrumentation<'a, G, R>) -> Self {
        SimScheduler { kernel, instr }
    }

    /// Drive `tasks` until the clock reaches `horizon`
    ///
    /// A release that starts before `horizon` always runs to completion,
    /// so the clock may end slightly past it.
    pub fn run_until(&self, tasks: &mut [&mut dyn Schedulable], horizon: OsTick) -> SimReport {
        let mut report = SimReport::default();

        loop {
            let now = self.kernel.tick_count();
            if tick_reached(now, horizon) {
                return report;
            }

            let ready = tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| tick_reached(now, t.next_release()))
                .min_by_key(|(_, t)| {
                    let deadline = t.next_release().wrapping_add(t.period());
                    (deadline.wrapping_sub(now) as i32, t.id())
                })
                .map(|(i, _)| i);

            match ready {
                Some(i) => {
                    let release = tasks[i].step();
                    report.releases += 1;
                    report.skipped += release.skipped;
                }
                None => {
                    let wake = tasks
                        .iter()
                        .map(|t| t.next_release())
                        .min_by_key(|&w| ticks_between(now, w))
                        .unwrap_or(horizon);
                    let wake = if tick_before(horizon, wake) { horizon } else { wake };

                    self.instr.idle_hook();
                    report.idle_entries += 1;
                    self.kernel.advance_to(wake);
                }
            }
        }
    }
}
