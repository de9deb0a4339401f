//! Core type definitions

/// Tick counter type
pub type OsTick = u32;

/// Word-sized stack element of a preemptive (Cortex-M) stack
pub type OsStkElement = u32;

/// Byte-sized stack element of a cooperative (AVR) stack
pub type OsStkByte = u8;

/// Switch counter type
pub type OsSwitchCtr = u32;
