//! Stack frame builders
//!
//! Each builder synthesises, on a fresh stack, the register image its
//! transport's restore sequence expects, so that the first restore lands
//! at the task entry with the argument loaded. The matching `unstack`
//! functions replay the restore order and are used to inspect frames.
//!
//! Stacks are plain slices; the saved stack pointer is carried as a
//! [`StackTop`] index into the slice rather than as a raw pointer.

pub mod armv7m;
pub mod avr;

/// Index of the saved stack pointer within a task's stack slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackTop(usize);

impl StackTop {
    /// Wrap a raw index
    #[inline]
    pub const fn new(index: usize) -> Self {
        StackTop(index)
    }

    /// Element index into the stack slice
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}
