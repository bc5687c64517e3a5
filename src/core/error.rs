//! Error types for the harness
//!
//! Every failure a task can observe is transient: the caller drops the
//! current cycle's work and tries again on its next release.

/// Harness error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OsError {
    // ============ Queue errors ============
    /// Queue is full (non-blocking attempt)
    QFull = 26001,
    /// Queue is empty (non-blocking attempt)
    QEmpty = 26002,

    // ============ Timeout ============
    /// Bounded wait expired before the queue could serve the call
    Timeout = 29401,
}

/// Result type alias for harness operations
pub type OsResult<T> = Result<T, OsError>;

impl OsError {
    /// Numeric code, stable across releases
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }}
