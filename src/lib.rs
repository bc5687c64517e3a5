//! Deadline-aware periodic task harness
//!
//! Runs a fixed set of periodic tasks on top of a host real-time kernel:
//! - Fixed-period releases with drift-free, no-catch-up release timing
//! - A bounded message queue with timed blocking on both ends
//! - GPIO pulse tracing of every task, the idle context and the tick
//! - Per-task busy-time accounting and an idle-time CPU load estimate

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod core;
pub mod instrument;
pub mod port;
pub mod sync;
pub mod task;

// ============ Re-exports ============

pub use self::core::config;
pub use self::core::config::*;
pub use self::core::critical;
pub use self::core::cs_cell;
pub use self::core::error;
pub use self::core::error::{OsError, OsResult};
pub use self::core::time;
pub use self::core::types;
pub use self::core::types::*;

pub use sync::message;
pub use sync::message::{Message, MessageId};
pub use sync::queue;
pub use sync::queue::{MessageQueue, Queue};

pub use instrument::{ExecutionBudget, Instrumentation, PerfMonitor, SpinBudget, Tracer};
pub use port::{ByteSink, GpioPort, Kernel, ReferenceTimer};
pub use task::{PeriodicRunner, PeriodicTask, Release, Schedulable, TaskDescriptor};

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
