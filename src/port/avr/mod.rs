//! AVR port implementation
//!
//! Cooperative only: no interrupt source ever switches tasks. The save
//! and restore sequences are the exact mirror of [`crate::frame::avr`]
//! and both go through the global [`COOP`] kernel, whose first word is
//! the current TCB pointer.
//!
//! I/O addresses: SREG `0x3F`, SPH `0x3E`, SPL `0x3D`.

use core::arch::naked_asm;

use crate::coop::COOP;
use crate::error::{OsError, OsResult};
use crate::task::TaskFn;

/// Save the whole register file onto the current stack, record SP in the
/// current TCB, then immediately restore from the same TCB and return.
///
/// Behaves as a no-op for the caller. SREG is captured before `cli`, so
/// the restored image keeps the caller's interrupt state.
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn port_checkpoint() {
    naked_asm!(
        // save
        "push r0",
        "in r0, 0x3F",
        "cli",
        "push r0",
        "push r1",
        "clr r1",
        "push r2",
        "push r3",
        "push r4",
        "push r5",
        "push r6",
        "push r7",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "push r16",
        "push r17",
        "push r18",
        "push r19",
        "push r20",
        "push r21",
        "push r22",
        "push r23",
        "push r24",
        "push r25",
        "push r26",
        "push r27",
        "push r28",
        "push r29",
        "push r30",
        "push r31",
        "lds r26, {current}",
        "lds r27, {current}+1",
        "in r0, 0x3D",
        "st x+, r0",
        "in r0, 0x3E",
        "st x+, r0",
        // restore
        "lds r26, {current}",
        "lds r27, {current}+1",
        "ld r28, x+",
        "out 0x3D, r28",
        "ld r29, x+",
        "out 0x3E, r29",
        "pop r31",
        "pop r30",
        "pop r29",
        "pop r28",
        "pop r27",
        "pop r26",
        "pop r25",
        "pop r24",
        "pop r23",
        "pop r22",
        "pop r21",
        "pop r20",
        "pop r19",
        "pop r18",
        "pop r17",
        "pop r16",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop r7",
        "pop r6",
        "pop r5",
        "pop r4",
        "pop r3",
        "pop r2",
        "pop r1",
        "pop r0",
        "out 0x3F, r0",
        "pop r0",
        "ret",
        current = sym COOP,
    );
}

/// Load SP from the current TCB, pop its register image and `ret` into
/// the address found beneath it.
///
/// The caller's stack is abandoned.
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn port_start_current() -> ! {
    naked_asm!(
        "lds r26, {current}",
        "lds r27, {current}+1",
        "ld r28, x+",
        "out 0x3D, r28",
        "ld r29, x+",
        "out 0x3E, r29",
        "pop r31",
        "pop r30",
        "pop r29",
        "pop r28",
        "pop r27",
        "pop r26",
        "pop r25",
        "pop r24",
        "pop r23",
        "pop r22",
        "pop r21",
        "pop r20",
        "pop r19",
        "pop r18",
        "pop r17",
        "pop r16",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop r7",
        "pop r6",
        "pop r5",
        "pop r4",
        "pop r3",
        "pop r2",
        "pop r1",
        "pop r0",
        "out 0x3F, r0",
        "pop r0",
        "ret",
        current = sym COOP,
    );
}

/// Checkpoint the running task.
///
/// Saves and restores against the same TCB, so control comes straight
/// back. Fails if no task has been spawned yet.
#[inline]
pub fn os_checkpoint() -> OsResult<()> {
    if COOP.current().is_none() {
        return Err(OsError::OsNotRunning);
    }
    unsafe { port_checkpoint() };
    Ok(())
}

/// Replace the running context with a fresh task for `entry(arg)`.
///
/// Carves a new TCB from the ring, makes it current and restores it. The
/// calling task is gone for good; from `main` this is the bootstrap.
pub fn os_task_replace(entry: TaskFn, arg: *mut ()) -> ! {
    COOP.spawn(entry as usize as u16, arg as usize as u16);
    unsafe { port_start_current() }
}
