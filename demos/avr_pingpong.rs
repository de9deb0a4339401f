//! Cooperative ping-pong on an ATmega328P
//!
//! Two tasks blink PB5 at different rates. Each one checkpoints itself
//! on every toggle, then hands the CPU to the next task in the rotation by replacing its
//! own context with a fresh one.

#![no_std]
#![no_main]

use core::ptr;

use twinos::coop::{Rotation, COOP};
use twinos::port::{os_checkpoint, os_task_replace};
use twinos::time::os_spin_ms;

// ============ LED Control ============

const DDRB: *mut u8 = 0x24 as *mut u8;
const PORTB: *mut u8 = 0x25 as *mut u8;
const PB5: u8 = 1 << 5;

fn led_init() {
    unsafe { ptr::write_volatile(DDRB, ptr::read_volatile(DDRB) | PB5) };
}

fn led_toggle() {
    unsafe { ptr::write_volatile(PORTB, ptr::read_volatile(PORTB) ^ PB5) };
}

// ============ Tasks ============

static ROTATION: Rotation<2> = Rotation::new([slow_task, fast_task]);

fn blink_then_yield(index: usize, times: u8, half_period_ms: u32, arg: *mut ()) -> ! {
    for _ in 0..times * 2 {
        led_toggle();
        os_spin_ms(half_period_ms);

        if os_checkpoint().is_err() {
            twinos::error!("checkpoint without a current task");
        }
    }

    twinos::debug!("lap {}", COOP.with_ring(|ring| ring.laps()));
    os_task_replace(ROTATION.after(index), arg)
}

extern "C" fn slow_task(arg: *mut ()) {
    blink_then_yield(0, 2, 500, arg)
}

extern "C" fn fast_task(arg: *mut ()) {
    blink_then_yield(1, 5, 100, arg)
}

// ============ Main ============

#[no_mangle]
pub extern "C" fn main() -> ! {
    led_init();
    os_task_replace(ROTATION.get(0), ptr::null_mut())
}
