//! Error types
//!
//! The kernel has no recoverable failure inside a switch. Errors exist only
//! at the API edges that safe code can misuse.

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum OsError {
    // ============ OS state errors ============
    /// Scheduler has not been started
    OsNotRunning = 24201,
    /// Scheduler is already running
    OsRunning = 24202,

    // ============ ISR errors ============
    /// Scheduler cannot be started from an interrupt handler
    StartIsr = 24205,
}

/// Result type alias for kernel operations
pub type OsResult<T> = Result<T, OsError>;

impl OsError {
    /// Numeric error code
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }
}
