//! Armv7-M exception frame
//!
//! Layout, from high address to low, as left behind by PendSV:
//!
//! ```text
//!   xPSR  PC  LR  R12  R3  R2  R1  R0      <- stacked by hardware
//!   EXC_RETURN  R11 .. R4                  <- stacked by PendSV
//! ```
//!
//! The restore path pops `r4-r11, lr` with `ldmia`, then the exception
//! return unstacks the hardware frame.

use super::StackTop;
use crate::types::OsStkElement;

/// xPSR with only the Thumb bit set
pub const INITIAL_XPSR: u32 = 0x0100_0000;

/// Return to thread mode, process stack, no FP context
pub const INITIAL_EXC_RETURN: u32 = 0xFFFF_FFFD;

/// PC values loaded by an exception return must have bit 0 clear
pub const START_ADDRESS_MASK: u32 = 0xFFFF_FFFE;

/// Words occupied by the synthetic frame
pub const FRAME_WORDS: usize = 17;

/// Bit of EXC_RETURN that is clear when the task has FP context stacked
pub const EXC_RETURN_NO_FP: u32 = 0x10;

/// Register image seen by a task on its first restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialContext {
    /// r0-r12
    pub r: [u32; 13],
    pub lr: u32,
    pub pc: u32,
    pub xpsr: u32,
    /// Value PendSV pops into lr before `bx lr`
    pub exc_return: u32,
}

impl InitialContext {
    /// The argument register
    #[inline]
    pub fn arg(&self) -> u32 {
        self.r[0]
    }

    /// Whether the frame carries high FP registers
    #[inline]
    pub fn uses_fpu(&self) -> bool {
        self.exc_return & EXC_RETURN_NO_FP == 0
    }
}

/// Build the initial frame at the top of `stack`.
///
/// The last element is left unused and the frame is written below it.
/// Scratch registers are not initialised.
///
/// # Preconditions
/// `stack` must hold at least `FRAME_WORDS + 1` elements. A shorter stack
/// is a caller bug; it is only checked in debug builds.
pub fn build(stack: &mut [OsStkElement], entry: u32, arg: u32, exit: u32) -> StackTop {
    debug_assert!(stack.len() > FRAME_WORDS, "stack too small for frame");

    let mut top = stack.len() - 1;

    top -= 1;
    stack[top] = INITIAL_XPSR;
    top -= 1;
    stack[top] = entry & START_ADDRESS_MASK;
    top -= 1;
    stack[top] = exit;

    // r12, r3, r2, r1
    top -= 5;
    stack[top] = arg;

    top -= 1;
    stack[top] = INITIAL_EXC_RETURN;

    // r11 .. r4
    top -= 8;

    StackTop::new(top)
}

/// Replay the restore sequence on a frame built by [`build`].
pub fn unstack(stack: &[OsStkElement], top: StackTop) -> InitialContext {
    let sw = &stack[top.index()..top.index() + 9];
    let hw = &stack[top.index() + 9..top.index() + FRAME_WORDS];

    let mut r = [0u32; 13];
    r[4..12].copy_from_slice(&sw[..8]);
    r[..4].copy_from_slice(&hw[..4]);
    r[12] = hw[4];

    InitialContext {
        r,
        lr: hw[5],
        pc: hw[6],
        xpsr: hw[7],
        exc_return: sw[8],
    }
}
