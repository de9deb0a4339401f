//! Cortex-M4/M7 port implementation
//!
//! Bootstraps the first task with `svc 0` and switches with PendSV. Both
//! handlers work on the global [`KERNEL`]: they load its first word, the
//! current TCB pointer, and from there the saved stack pointer at offset
//! zero of the TCB.

use core::arch::{asm, naked_asm};
use core::ptr::NonNull;

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;

use super::Transport;
use crate::config::{CFG_CPU_HZ, CFG_KERNEL_PRIO, CFG_MAX_SYSCALL_PRIO, CFG_TICK_RATE_HZ};
use crate::critical::CriticalSection;
use crate::kernel::KERNEL;
use crate::task::OsTcb;

/// PendSV/SVC based transport
pub struct CortexM4;

impl Transport for CortexM4 {
    unsafe fn bootstrap(&self, cs: CriticalSection, first: NonNull<OsTcb>) {
        debug_assert!(KERNEL.current() == Some(first), "bootstrap target not published");

        let mut p = unsafe { cortex_m::Peripherals::steal() };
        unsafe {
            p.SCB.set_priority(SystemHandler::PendSV, CFG_KERNEL_PRIO);
            p.SCB.set_priority(SystemHandler::SysTick, CFG_KERNEL_PRIO);
        }
        os_cpu_systick_init(&mut p.SYST, CFG_CPU_HZ / CFG_TICK_RATE_HZ);

        // Still masked; os_start_first_task unmasks right before `svc 0`
        cs.hand_off();
        unsafe { os_start_first_task() }
    }

    #[inline(always)]
    fn request_switch(&self) {
        cortex_m::peripheral::SCB::set_pendsv();
    }
}

/// Initialize SysTick timer for system tick generation
///
/// # Arguments
/// * `cnts` - Reload value, core clock divided by tick rate
pub fn os_cpu_systick_init(syst: &mut cortex_m::peripheral::SYST, cnts: u32) {
    syst.set_reload(cnts - 1);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_interrupt();
    syst.enable_counter();
}

/// Reset MSP to the top of the vector table's initial stack, clear
/// CONTROL (drops any FP context flag), unmask interrupts and trap into
/// [`SVCall`].
unsafe fn os_start_first_task() -> ! {
    unsafe {
        asm!(
            "movw r0, #0xED08",
            "movt r0, #0xE000",
            "ldr r0, [r0]",
            "ldr r0, [r0]",
            "msr msp, r0",
            "mov r0, #0",
            "msr control, r0",
            "cpsie i",
            "cpsie f",
            "dsb",
            "isb",
            "svc 0",
            "nop",
            options(noreturn),
        )
    }
}

/// Pick the next TCB; called from [`PendSV`] with BASEPRI raised
#[no_mangle]
extern "C" fn os_task_switch_context() {
    KERNEL.switch_context();
}

/// SVC handler - restores the first task
///
/// Pops `r4-r11` and EXC_RETURN from the current TCB's frame, points PSP
/// at the remaining hardware frame and returns into the task.
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn SVCall() {
    naked_asm!(
        "ldr r3, ={kernel}",
        "ldr r1, [r3]",
        "ldr r0, [r1]",
        "ldmia r0!, {{r4-r11, r14}}",
        "msr psp, r0",
        "isb",
        "mov r0, #0",
        "msr basepri, r0",
        "bx r14",
        kernel = sym KERNEL,
    );
}

/// PendSV exception handler - performs the context switch
///
/// 1. Save `r4-r11` and EXC_RETURN (and `s16-s31` if the task used the
///    FPU) below the hardware frame on PSP
/// 2. Store PSP into the current TCB
/// 3. Raise BASEPRI and let the kernel pick the next TCB
/// 4. Load the new TCB's stack pointer and restore in reverse
#[cfg(target_abi = "eabihf")]
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        ".fpu fpv4-sp-d16",
        "mrs r0, psp",
        "isb",

        "ldr r3, ={kernel}",
        "ldr r2, [r3]",

        // EXC_RETURN bit 4 clear: FP context is live
        "tst r14, #0x10",
        "it eq",
        "vstmdbeq r0!, {{s16-s31}}",

        "stmdb r0!, {{r4-r11, r14}}",
        "str r0, [r2]",

        "stmdb sp!, {{r0, r3}}",
        "mov r0, #{basepri}",
        // Cortex-M7 r0p1 erratum 837070
        "cpsid i",
        "msr basepri, r0",
        "dsb",
        "isb",
        "cpsie i",
        "bl {switch}",
        "mov r0, #0",
        "msr basepri, r0",
        "ldmia sp!, {{r0, r3}}",

        "ldr r1, [r3]",
        "ldr r0, [r1]",
        "ldmia r0!, {{r4-r11, r14}}",

        "tst r14, #0x10",
        "it eq",
        "vldmiaeq r0!, {{s16-s31}}",

        "msr psp, r0",
        "isb",
        "bx r14",
        kernel = sym KERNEL,
        switch = sym os_task_switch_context,
        basepri = const CFG_MAX_SYSCALL_PRIO,
    );
}

/// PendSV exception handler - performs the context switch
///
/// Soft-float build: no FP registers to preserve.
#[cfg(not(target_abi = "eabihf"))]
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        "mrs r0, psp",
        "isb",

        "ldr r3, ={kernel}",
        "ldr r2, [r3]",

        "stmdb r0!, {{r4-r11, r14}}",
        "str r0, [r2]",

        "stmdb sp!, {{r0, r3}}",
        "mov r0, #{basepri}",
        "cpsid i",
        "msr basepri, r0",
        "dsb",
        "isb",
        "cpsie i",
        "bl {switch}",
        "mov r0, #0",
        "msr basepri, r0",
        "ldmia sp!, {{r0, r3}}",

        "ldr r1, [r3]",
        "ldr r0, [r1]",
        "ldmia r0!, {{r4-r11, r14}}",

        "msr psp, r0",
        "isb",
        "bx r14",
        kernel = sym KERNEL,
        switch = sym os_task_switch_context,
        basepri = const CFG_MAX_SYSCALL_PRIO,
    );
}

/// System tick; pends a switch at every slice boundary
#[exception]
fn SysTick() {
    KERNEL.tick(&CortexM4);
}
