//! Compile-time configuration
//!
//! These constants fix the task count, stack sizes and the cooperative
//! ring geometry. Nothing is sized at runtime.

/// Stack size of each preemptive TCB, in words
pub const CFG_STK_SIZE: usize = 512;

/// Number of statically owned preemptive TCBs
pub const CFG_TASK_COUNT: usize = 2;

/// Size of the cooperative TCB ring, in bytes
pub const CFG_RING_SIZE: usize = 1024;

/// Width of one cooperative slot (stack region and header stride), in bytes
pub const CFG_RING_SLOT: usize = 80;

/// Core clock, used by the cycle-counted delays and the SysTick reload
pub const CFG_CPU_HZ: u32 = 16_000_000;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Ticks between two preemptive switch requests
pub const CFG_TIME_SLICE_TICKS: u32 = 10;

/// Priority of PendSV and SysTick (lowest)
pub const CFG_KERNEL_PRIO: u8 = 0xF0;

/// BASEPRI value held while the current TCB is swapped
pub const CFG_MAX_SYSCALL_PRIO: u8 = 0x50;
