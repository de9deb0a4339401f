//! The "current TCB" reference
//!
//! The only datum shared between task code, the scheduler and the
//! transports. It has the layout of a plain pointer: the assembly in
//! [`crate::port`] loads it by symbol and dereferences offset zero to
//! reach the saved stack pointer.

use core::ptr::NonNull;

use portable_atomic::{AtomicPtr, Ordering};

use crate::critical::CriticalSection;

/// Slot holding the address of the TCB whose frame is live in the CPU.
#[repr(transparent)]
pub struct CurrentTcb<T> {
    ptr: AtomicPtr<T>,
}

impl<T> CurrentTcb<T> {
    /// An empty slot; nothing has been bootstrapped yet.
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(core::ptr::null_mut()),
        }
    }

    /// The published TCB, if any.
    #[inline(always)]
    pub fn get(&self) -> Option<NonNull<T>> {
        NonNull::new(self.ptr.load(Ordering::Acquire))
    }

    /// Publish `tcb` as current.
    ///
    /// Single word store: a reader observes either the old or the new
    /// value, never a mix.
    #[inline(always)]
    pub fn set(&self, _cs: &CriticalSection, tcb: NonNull<T>) {
        self.ptr.store(tcb.as_ptr(), Ordering::Release);
    }
}

impl<T> Default for CurrentTcb<T> {
    fn default() -> Self {
        Self::new()
    }
}
