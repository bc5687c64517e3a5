//! Digital-pin tracer
//!
//! Each execution context owns one output line. A logic analyser on the
//! probe port then shows exactly when every task, the idle context and the
//! tick interrupt were running.

use crate::config::{PROBE_IDLE, PROBE_PORT, PROBE_TASK_BASE, PROBE_TICK};
use crate::port::GpioPort;
use crate::types::{Level, Line, TaskId};

/// Trace line of every context, indexed by [`TaskId::index`]
pub const TRACE_MAP: [Line; TaskId::ALL.len()] = [
    PROBE_IDLE,
    Line::new(PROBE_PORT, PROBE_TASK_BASE),
    Line::new(PROBE_PORT, PROBE_TASK_BASE + 1),
    Line::new(PROBE_PORT, PROBE_TASK_BASE + 2),
    Line::new(PROBE_PORT, PROBE_TASK_BASE + 3),
    Line::new(PROBE_PORT, PROBE_TASK_BASE + 4),
    Line::new(PROBE_PORT, PROBE_TASK_BASE + 5),
];

/// Trace line assigned to `id`
#[inline]
pub const fn trace_line(id: TaskId) -> Line {
    TRACE_MAP[id.index()]
}

/// Pulses probe lines around task activity
pub struct Tracer<'a, G: GpioPort> {
    gpio: &'a G,
}

impl<'a, G: GpioPort> Tracer<'a, G> {
    pub const fn new(gpio: &'a G) -> Self {
        Tracer { gpio }
    }

    /// Raise the line of `id`
    #[inline]
    pub fn mark_enter(&self, id: TaskId) {
        self.gpio.write(trace_line(id), Level::High);
    }

    /// Lower the line of `id`
    #[inline]
    pub fn mark_exit(&self, id: TaskId) {
        self.gpio.write(trace_line(id), Level::Low);
    }

    /// Single high-low pulse on the tick probe
    #[inline]
    pub fn mark_tick(&self) {
        self.gpio.write(PROBE_TICK, Level::High);
        self.gpio.write(PROBE_TICK, Level::Low);
    }
}
