//! Port layer - context-switch transports
//!
//! The only target-specific code in the crate. Frame construction and
//! scheduling live in [`crate::core`]; a transport just moves the register
//! file in and out of the frames those build.

use core::ptr::NonNull;

use crate::critical::CriticalSection;
use crate::task::OsTcb;

/// Preemptive context-switch transport
pub trait Transport {
    /// Restore `first`'s initial frame and start running it.
    ///
    /// One-shot: makes no scheduling decision and, on hardware, does not
    /// return. Entered inside the critical section that built the frames;
    /// interrupts stay masked until the first task is live, so a transport
    /// that does not return unmasks them itself and calls
    /// [`CriticalSection::hand_off`].
    ///
    /// # Safety
    /// `first` must be the published current TCB with a frame built by
    /// [`OsTcb::init`], and nothing may be running yet.
    unsafe fn bootstrap(&self, cs: CriticalSection, first: NonNull<OsTcb>);

    /// Pend a deferred switch away from the running task.
    fn request_switch(&self);
}

#[cfg(target_arch = "arm")]
pub mod cortex_m4;

#[cfg(target_arch = "arm")]
pub use cortex_m4::*;

#[cfg(target_arch = "avr")]
pub mod avr;

#[cfg(target_arch = "avr")]
pub use avr::*;

// Recording transport for host builds
#[cfg(not(any(target_arch = "arm", target_arch = "avr")))]
pub mod stub;

#[cfg(not(any(target_arch = "arm", target_arch = "avr")))]
pub use stub::*;
