//! Critical section handling
//!
//! Thin RAII layer over the `critical-section` crate. The platform
//! implementation masks interrupts (PRIMASK on Cortex-M, the SREG I bit on
//! AVR); host builds use the crate's `std` implementation.

use portable_atomic::{AtomicU8, Ordering};

/// Current critical section nesting depth
static NESTING: AtomicU8 = AtomicU8::new(0);

/// RAII guard for critical sections
///
/// Interrupts are masked while the guard lives and restored to their
/// previous state when it is dropped. Guards must be dropped in reverse
/// order of creation.
pub struct CriticalSection {
    restore: critical_section::RestoreState,
}

impl CriticalSection {
    /// Enter a critical section.
    #[inline(always)]
    pub fn enter() -> Self {
        let restore = unsafe { critical_section::acquire() };
        NESTING.fetch_add(1, Ordering::Relaxed);
        CriticalSection { restore }
    }

    /// Leave the section without restoring the saved interrupt state.
    ///
    /// For a caller that never returns and unmasks interrupts itself,
    /// like a transport jumping into the first task.
    #[inline(always)]
    pub fn hand_off(self) {
        NESTING.fetch_sub(1, Ordering::Relaxed);
        core::mem::forget(self);
    }

    /// Check if we're currently in a critical section
    #[inline(always)]
    pub fn is_active() -> bool {
        NESTING.load(Ordering::Relaxed) > 0
    }
}

impl Drop for CriticalSection {
    #[inline(always)]
    fn drop(&mut self) {
        NESTING.fetch_sub(1, Ordering::Relaxed);
        unsafe { critical_section::release(self.restore) };
    }
}

/// Execute a closure with interrupts disabled
///
/// The closure receives the guard, which unlocks [`CsCell`] and
/// [`CurrentTcb`] writes.
///
/// [`CsCell`]: crate::core::cs_cell::CsCell
/// [`CurrentTcb`]: crate::core::current::CurrentTcb
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
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
