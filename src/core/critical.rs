//! Critical section handling
//!
//! Thin layer over the `critical-section` crate. On ARM the crate root
//! registers a PRIMASK implementation; host builds use whatever
//! implementation the final binary links (the `std` one in tests).

pub use critical_section::CriticalSection;

/// Execute a closure with interrupts disabled
///
/// Keep the closure short: it runs with every interrupt masked.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}

/// Check if currently executing in an ISR context
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        false
    }
}
