//! Blink Example - two preemptive tasks on STM32F401
//!
//! Task A drives the LED, task B logs a heartbeat. Neither ever yields;
//! SysTick slices the CPU between them.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use twinos::port::CortexM4;
use twinos::time::{ms_to_ticks, os_time_dly_busy};
use twinos::{TaskEntry, KERNEL};

use stm32_metapac as pac;

// ============ LED Control ============

fn led_init() {
    pac::RCC.ahb1enr().modify(|w| w.set_gpioaen(true));
    pac::GPIOA.moder().modify(|w| w.set_moder(5, pac::gpio::vals::Moder::OUTPUT));
    pac::GPIOA.otyper().modify(|w| w.set_ot(5, pac::gpio::vals::Ot::PUSHPULL));
}

fn led_on() { pac::GPIOA.bsrr().write(|w| w.set_bs(5, true)); }

fn led_off() { pac::GPIOA.bsrr().write(|w| w.set_br(5, true)); }

// ============ Tasks ============

extern "C" fn blink_task(_: *mut ()) {
    twinos::info!("blink task started");
    loop {
        led_on();
        os_time_dly_busy(ms_to_ticks(500));

        led_off();
        os_time_dly_busy(ms_to_ticks(500));
    }
}

extern "C" fn beat_task(_: *mut ()) {
    twinos::info!("beat task started");
    loop {
        twinos::info!("beat, {} switches", KERNEL.switch_count());
        os_time_dly_busy(ms_to_ticks(1000));
    }
}

// ============ Main ============

#[entry]
fn main() -> ! {
    led_init();

    KERNEL
        .start(&CortexM4, [TaskEntry::new(blink_task), TaskEntry::new(beat_task)])
        .expect("OS start failed");

    loop { cortex_m::asm::nop(); }
}
