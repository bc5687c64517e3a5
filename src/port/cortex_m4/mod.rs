//! Cortex-M4 port implementation
//!
//! Reference timer on the DWT cycle counter and a byte sink on the
//! semihosting console. The PRIMASK critical section is registered in the
//! crate root.

use cortex_m::peripheral::{DCB, DWT};
use cortex_m_semihosting::hio;

use crate::port::{ByteSink, ReferenceTimer};
use crate::types::TimerCount;

/// Free-running reference timer on the DWT cycle counter
///
/// Counts core cycles and wraps at `u32::MAX`; at 84 MHz that is about
/// 51 s, far longer than any load window.
pub struct DwtTimer {
    _private: (),
}

impl DwtTimer {
    /// Enable tracing and start the cycle counter from zero
    pub fn start(dcb: &mut DCB, dwt: &mut DWT) -> Self {
        dcb.enable_trace();
        dwt.set_cycle_count(0);
        dwt.enable_cycle_counter();
        DwtTimer { _private: () }
    }
}

impl ReferenceTimer for DwtTimer {
    #[inline]
    fn count(&self) -> TimerCount {
        DWT::cycle_count()
    }
}

/// Byte sink writing to the debugger's semihosting stdout
///
/// Slow (every call traps into the debugger); meant for bring-up without
/// a UART.
pub struct SemihostingSink;

impl ByteSink for SemihostingSink {
    fn put_bytes(&self, bytes: &[u8]) {
        if let Ok(mut out) = hio::hstdout() {
            // No debugger attached: drop the output
            let _ = out.write_all(bytes);
        }
    }
}
