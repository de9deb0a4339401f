//! AVR cooperative frame
//!
//! Mirrors the save sequence in [`crate::port`]: `r0`, then SREG (captured
//! before `cli`), `r1`, `r2` .. `r31`. The return address sits beneath all
//! of it and is consumed by the final `ret`.
//!
//! Pop order on restore: `r31` .. `r2`, `r1`, SREG, `r0`, then `ret` takes
//! the high and low bytes of the entry address.

use super::StackTop;
use crate::types::OsStkByte;

/// SREG with the global interrupt enable bit set
pub const SREG_INT_ENABLED: u8 = 0x80;

/// Bytes occupied by the synthetic frame
pub const FRAME_LEN: usize = 35;

/// Register image seen by a task on its first restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvrContext {
    /// r0-r31
    pub r: [u8; 32],
    pub sreg: u8,
    /// Word address `ret` jumps to
    pub pc: u16,
}

impl AvrContext {
    /// First pointer argument, passed in r25:r24
    #[inline]
    pub fn arg(&self) -> u16 {
        u16::from_le_bytes([self.r[24], self.r[25]])
    }
}

/// Build the initial frame ending at the last byte of `stack`.
///
/// Returns the stack pointer value to record in the TCB. AVR `SP` points
/// at the next free byte, so the result lies one below the frame.
///
/// # Preconditions
/// `stack` must hold more than `FRAME_LEN` bytes; checked in debug builds
/// only.
pub fn build(stack: &mut [OsStkByte], entry: u16, arg: u16) -> StackTop {
    debug_assert!(stack.len() > FRAME_LEN, "stack too small for frame");

    let [entry_lo, entry_hi] = entry.to_le_bytes();
    let [arg_lo, arg_hi] = arg.to_le_bytes();
    let mut top = stack.len() - 1;

    // Popped last, by `ret`
    stack[top] = entry_lo;
    top -= 1;
    stack[top] = entry_hi;
    top -= 1;

    stack[top] = 0x00; // r0
    top -= 1;
    stack[top] = SREG_INT_ENABLED;
    top -= 1;
    stack[top] = 0x00; // r1, the zero register

    // r2 .. r23 untouched
    top -= 23;

    stack[top] = arg_lo; // r24
    top -= 1;
    stack[top] = arg_hi; // r25

    // r26 .. r31 untouched
    top -= 7;

    StackTop::new(top)
}

/// Replay the restore sequence on a frame built by [`build`].
pub fn unstack(stack: &[OsStkByte], sp: StackTop) -> AvrContext {
    let mut at = sp.index();
    let mut pop = || {
        at += 1;
        stack[at]
    };

    let mut r = [0u8; 32];
    for reg in (2..32).rev() {
        r[reg] = pop();
    }
    r[1] = pop();
    let sreg = pop();
    r[0] = pop();

    let hi = pop();
    let lo = pop();

    AvrContext {
        r,
        sreg,
        pc: u16::from_be_bytes([hi, lo]),
    }
}
