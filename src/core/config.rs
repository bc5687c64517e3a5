//! Compile-time configuration for the task set
//!
//! These constants fix the periods, workloads, queue geometry and trace
//! wiring of the harness. Periods and budgets are expressed in kernel ticks
//! and budget units respectively.

use crate::types::{Line, OsTick, Port, TaskId};

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Number of application tasks (idle excluded)
pub const NUMBER_OF_TASKS: usize = 6;

/// Number of message slots in the shared queue
pub const QUEUE_LENGTH: usize = 10;

/// Fixed payload length of every message, terminator included
pub const MESSAGE_BUFFER_SIZE: usize = 25;

/// Upper bound on how long a task waits on the queue, in ticks
pub const MAX_QUEUE_WAIT_TIME: OsTick = 5;

/// Busy-loop iterations that approximate one budget unit (about 1 ms)
pub const ET_TO_COUNT_MAP: u32 = 6666;

// ============ Periods ============

pub const PERIODICITY_BUTTON_1: OsTick = 50;
pub const PERIODICITY_BUTTON_2: OsTick = 50;
pub const PERIODICITY_TRANSMITTER: OsTick = 100;
pub const PERIODICITY_RECEIVER: OsTick = 20;
pub const PERIODICITY_LOAD_1: OsTick = 10;
pub const PERIODICITY_LOAD_2: OsTick = 100;

// ============ Simulated workloads ============

/// Execution budget of the first load generator, in units
pub const ET_LOAD_1: u32 = 5;
/// Execution budget of the second load generator, in units
pub const ET_LOAD_2: u32 = 12;

// ============ Trace and input wiring ============

/// Port carrying every trace probe
pub const PROBE_PORT: Port = Port::Port0;

/// Probe pulsed once per kernel tick
pub const PROBE_TICK: Line = Line::new(PROBE_PORT, 0);

/// Probe raised while the idle context runs
pub const PROBE_IDLE: Line = Line::new(PROBE_PORT, 7);

/// First task probe; task `n` uses pin `n`
pub const PROBE_TASK_BASE: u8 = 1;

/// Push button watched by the first monitor
pub const BUTTON_1_INPUT: Line = Line::new(Port::Port1, 0);

/// Push button watched by the second monitor
pub const BUTTON_2_INPUT: Line = Line::new(Port::Port1, 1);

/// Static parameters of one periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskParams {
    pub id: TaskId,
    pub name: &'static str,
    pub period: OsTick,
    /// Simulated execution budget in units; zero for tasks doing real work
    pub budget: u32,
}

/// Every application task, in identity order
pub const TASK_TABLE: [TaskParams; NUMBER_OF_TASKS] = [
    TaskParams { id: TaskId::ButtonMonitor1, name: "Button_1_Monitor", period: PERIODICITY_BUTTON_1, budget: 0 },
    TaskParams { id: TaskId::ButtonMonitor2, name: "Button_2_Monitor", period: PERIODICITY_BUTTON_2, budget: 0 },
    TaskParams { id: TaskId::PeriodicTransmitter, name: "Periodic_Transmitter", period: PERIODICITY_TRANSMITTER, budget: 0 },
    TaskParams { id: TaskId::UartReceiver, name: "Uart_Receiver", period: PERIODICITY_RECEIVER, budget: 0 },
    TaskParams { id: TaskId::LoadSimulation1, name: "Load_1_Simulation", period: PERIODICITY_LOAD_1, budget: ET_LOAD_1 },
    TaskParams { id: TaskId::LoadSimulation2, name: "Load_2_Simulation", period: PERIODICITY_LOAD_2, budget: ET_LOAD_2 },
];

/// Look up the parameters of a task; `None` for the idle context
pub const fn task_params(id: TaskId) -> Option<TaskParams> {
    match id {
        TaskId::Idle => None,
        _ => Some(TASK_TABLE[id.index() - 1]),
    }
}
