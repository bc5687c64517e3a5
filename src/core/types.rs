//! Core type definitions
//!
//! These types give the task set, the trace wiring and the digital I/O
//! collaborators strong names instead of raw integers.

/// Kernel tick counter type
pub type OsTick = u32;

/// Free-running reference timer count
pub type TimerCount = u32;

/// Identity of an execution context
///
/// Ordinal 0 is the idle context; application tasks are numbered 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TaskId {
    Idle = 0,
    ButtonMonitor1 = 1,
    ButtonMonitor2 = 2,
    PeriodicTransmitter = 3,
    UartReceiver = 4,
    LoadSimulation1 = 5,
    LoadSimulation2 = 6,
}

impl TaskId {
    /// Every context, idle first
    pub const ALL: [TaskId; 7] = [
        TaskId::Idle,
        TaskId::ButtonMonitor1,
        TaskId::ButtonMonitor2,
        TaskId::PeriodicTransmitter,
        TaskId::UartReceiver,
        TaskId::LoadSimulation1,
        TaskId::LoadSimulation2,
    ];

    /// Ordinal used to index per-context tables
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<TaskId> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_idle(self) -> bool {
        matches!(self, TaskId::Idle)
    }
}

/// Digital level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub const fn from_bool(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Classification of two consecutive input samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    NoChange,
}

/// GPIO port selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    Port0 = 0,
    Port1 = 1,
}

/// A single digital line: port plus pin number (0..=31)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    pub port: Port,
    pub pin: u8,
}

impl Line {
    pub const fn new(port: Port, pin: u8) -> Self {
        Line { port, pin }
    }

    /// Bit of this pin inside a 32-bit port register
    #[inline(always)]
    pub const fn mask(self) -> u32 {
        1 << (self.pin as u32 & 31)
    }
}
