//! Critical section protected cell

use core::cell::UnsafeCell;

use crate::critical::CriticalSection;

/// A cell that can only be mutated within a critical section.
///
/// Transparent, so assembly can address the inner value through the
/// cell's symbol.
#[repr(transparent)]
pub struct CsCell<T>(UnsafeCell<T>);

unsafe impl<T> Sync for CsCell<T> {}

impl<T> CsCell<T> {
    /// Create a new CsCell
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Get a mutable reference to the inner value
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub fn get(&self, _cs: &CriticalSection) -> &mut T {
        unsafe { &mut *self.0.get() }
    }

    /// Get a raw pointer
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut T {
        self.0.get()
    }
}
