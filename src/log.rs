//! Logging macros for the harness
//!
//! With the `defmt` feature every macro forwards to the `defmt` macro of
//! the same name. Without it the macros expand to nothing, so host builds
//! and release images without a probe pay no cost.

use portable_atomic::{AtomicU32, Ordering};

use crate::types::OsTick;

/// Last kernel tick reported by the tick hook, used as the log timestamp
static LOG_TICK: AtomicU32 = AtomicU32::new(0);

#[inline]
pub(crate) fn set_log_tick(tick: OsTick) {
    LOG_TICK.store(tick, Ordering::Relaxed);
}

/// Timestamp attached to log frames
#[inline]
pub fn log_tick() -> OsTick {
    LOG_TICK.load(Ordering::Relaxed)
}

/// Trace message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

/// Debug message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

/// Info message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

/// Warning message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

/// Error message
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

// Compiled out without a probe
#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! trace { ($($arg:tt)*) => {}; }

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! debug { ($($arg:tt)*) => {}; }

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! info { ($($arg:tt)*) => {}; }

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! warn { ($($arg:tt)*) => {}; }

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! error { ($($arg:tt)*) => {}; }
