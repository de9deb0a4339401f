//! Task Control Block for the preemptive target

use core::ops::Range;

use crate::config::CFG_STK_SIZE;
use crate::frame::{armv7m, StackTop};
use crate::task::{exit_trap_addr, TaskEntry};
use crate::types::OsStkElement;

/// Task Control Block
///
/// `stk_ptr` must stay the first field: the transports load the saved
/// stack pointer from offset zero of the current TCB.
#[repr(C, align(8))]
pub struct OsTcb {
    /// Saved stack pointer, written and read only by the transport
    pub stk_ptr: *mut OsStkElement,
    /// Stack owned by this TCB for its whole lifetime
    stk: [OsStkElement; CFG_STK_SIZE],
}

const _: () = assert!(core::mem::offset_of!(OsTcb, stk_ptr) == 0);

impl OsTcb {
    /// Create a new, uninitialized TCB
    pub const fn new() -> Self {
        OsTcb {
            stk_ptr: core::ptr::null_mut(),
            stk: [0; CFG_STK_SIZE],
        }
    }

    /// Build the initial frame for `entry` and point `stk_ptr` at it.
    pub fn init(&mut self, entry: TaskEntry) {
        let top = armv7m::build(&mut self.stk, entry.addr(), entry.arg_word(), exit_trap_addr());
        self.stk_ptr = &mut self.stk[top.index()] as *mut OsStkElement;
    }

    /// Saved stack pointer as an index into [`Self::stack`]
    pub fn stack_top(&self) -> StackTop {
        let base = self.stk.as_ptr() as usize;
        let offset = (self.stk_ptr as usize).wrapping_sub(base) / core::mem::size_of::<OsStkElement>();
        debug_assert!(offset < CFG_STK_SIZE, "stack pointer outside owned stack");
        StackTop::new(offset)
    }

    /// Address range of the owned stack
    pub fn stack_range(&self) -> Range<usize> {
        let base = self.stk.as_ptr() as usize;
        base..base + core::mem::size_of_val(&self.stk)
    }

    /// Owned stack contents
    pub fn stack(&self) -> &[OsStkElement] {
        &self.stk
    }

    /// Whether a frame has been built
    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.stk_ptr.is_null()
    }
}

impl Default for OsTcb {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for OsTcb {}
unsafe impl Sync for OsTcb {}
