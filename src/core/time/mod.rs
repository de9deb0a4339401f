//! Time management
//!
//! Busy-wait delays only. The preemptive target counts SysTick ticks on
//! the global kernel; the cooperative target has no tick and spins for a
//! cycle budget instead.

use crate::config::{CFG_CPU_HZ, CFG_TICK_RATE_HZ};
use crate::kernel::KERNEL;
use crate::types::OsTick;

/// Current tick count of the global kernel
#[inline]
pub fn os_time_get() -> OsTick {
    KERNEL.tick_get()
}

/// Spin until `ticks` system ticks have elapsed.
///
/// The task keeps the CPU, so the other task only runs when a time slice
/// expires meanwhile. Must not be called with interrupts masked or before
/// the scheduler is started; the tick counter would never move.
pub fn os_time_dly_busy(ticks: OsTick) {
    let start = os_time_get();
    while os_time_get().wrapping_sub(start) < ticks {
        core::hint::spin_loop();
    }
}

/// Convert milliseconds to ticks, rounding up and saturating at
/// [`OsTick::MAX`]
#[inline]
pub const fn ms_to_ticks(ms: u32) -> OsTick {
    let ticks = (ms as u64 * CFG_TICK_RATE_HZ as u64).div_ceil(1000);
    if ticks > OsTick::MAX as u64 {
        OsTick::MAX
    } else {
        ticks as OsTick
    }
}

/// Spin for roughly `ms` milliseconds by counting CPU cycles.
///
/// Independent of interrupts and the tick. Time spent in interrupt
/// handlers is not subtracted.
pub fn os_spin_ms(ms: u32) {
    for _ in 0..ms {
        spin_cycles(CFG_CPU_HZ / 1000);
    }
}

#[cfg(target_arch = "arm")]
#[inline]
fn spin_cycles(cycles: u32) {
    cortex_m::asm::delay(cycles);
}

#[cfg(target_arch = "avr")]
#[inline]
fn spin_cycles(cycles: u32) {
    // nop + loop overhead is about four cycles per iteration
    for _ in 0..cycles / 4 {
        unsafe { core::arch::asm!("nop", options(nomem, nostack, preserves_flags)) };
    }
}

#[cfg(not(any(target_arch = "arm", target_arch = "avr")))]
#[inline]
fn spin_cycles(_cycles: u32) {}
