//! twinos: a two-task kernel core
//!
//! Task switching for two bare-metal targets:
//! - Cortex-M: preemptive two-way round robin driven by PendSV/SysTick
//! - AVR: cooperative switching through a ring of carved TCB slots
//!
//! Frame construction, the TCB stores and the scheduler are portable and
//! tested on the host; only the transports in [`port`] are target code.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

#[cfg(target_arch = "avr")]
mod cs_impl {
    use core::arch::asm;
    use critical_section::{set_impl, Impl, RawRestoreState};

    /// SREG global interrupt enable bit
    const SREG_I: u8 = 0x80;

    struct SregCriticalSection;
    set_impl!(SregCriticalSection);

    unsafe impl Impl for SregCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let sreg: u8;
            unsafe {
                asm!(
                    "in {0}, 0x3F",
                    "cli",
                    out(reg) sreg,
                    options(nostack),
                );
            }
            sreg & SREG_I != 0
        }

        unsafe fn release(was_enabled: RawRestoreState) {
            if was_enabled {
                unsafe { asm!("sei", options(nomem, nostack)) }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod core;
pub mod port;

// ============ Re-exports ============

pub use self::core::config;
pub use self::core::config::*;
pub use self::core::coop;
pub use self::core::critical;
pub use self::core::error;
pub use self::core::error::{OsError, OsResult};
pub use self::core::frame;
pub use self::core::kernel;
pub use self::core::kernel::{Kernel, KERNEL};
pub use self::core::ring;
pub use self::core::sched;
pub use self::core::task;
pub use self::core::task::{OsTcb, TaskEntry, TaskFn};
pub use self::core::time;
pub use self::core::types;
pub use self::core::types::*;

#[cfg(feature = "pac")]
pub use stm32_metapac as pac;
