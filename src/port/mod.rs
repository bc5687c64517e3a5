//! Port layer - collaborator interfaces
//!
//! The harness never touches a scheduler, a timer peripheral or a pin
//! register directly. It consumes the traits below; a board (or the host
//! simulation) provides the implementations.

use crate::types::{Level, Line, OsTick, TimerCount};

#[cfg(target_arch = "arm")]
pub mod cortex_m4;

#[cfg(target_arch = "arm")]
pub use cortex_m4::*;

#[cfg(all(target_arch = "arm", feature = "pac"))]
pub mod stm32f4;

#[cfg(any(not(target_arch = "arm"), feature = "sim"))]
pub mod sim;

/// Tick source and absolute delay of the host real-time kernel
pub trait Kernel {
    /// Current value of the monotonic tick counter
    fn tick_count(&self) -> OsTick;

    /// Suspend the calling task until `wake`
    ///
    /// Returns immediately when `wake` is not in the future.
    fn delay_until(&self, wake: OsTick);
}

/// Digital input/output primitive parameterised by port and line
///
/// Writes are fire-and-forget: a valid line never fails.
pub trait GpioPort {
    fn read(&self, line: Line) -> Level;

    fn write(&self, line: Line, level: Level);
}

/// Output sink for forwarded message payloads (a UART in the firmware)
pub trait ByteSink {
    fn put_bytes(&self, bytes: &[u8]);
}

/// Free-running hardware timer used for execution-time measurement
///
/// The count wraps at `u32::MAX`; consumers use wrapping differences.
pub trait ReferenceTimer {
    fn count(&self) -> TimerCount;
}
