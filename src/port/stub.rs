//! Host transport
//!
//! Records what the kernel asked for instead of touching registers, so
//! the portable kernel can be driven from tests.

use core::ptr::NonNull;

use portable_atomic::{AtomicBool, AtomicPtr, AtomicU32, Ordering};

use super::Transport;
use crate::critical::CriticalSection;
use crate::task::OsTcb;

/// Transport that counts bootstraps and pended switches
pub struct HostPort {
    bootstraps: AtomicU32,
    pended: AtomicU32,
    first: AtomicPtr<OsTcb>,
    masked: AtomicBool,
}

impl HostPort {
    pub const fn new() -> Self {
        HostPort {
            bootstraps: AtomicU32::new(0),
            pended: AtomicU32::new(0),
            first: AtomicPtr::new(core::ptr::null_mut()),
            masked: AtomicBool::new(false),
        }
    }

    /// Number of bootstrap calls
    pub fn bootstraps(&self) -> u32 {
        self.bootstraps.load(Ordering::Relaxed)
    }

    /// Number of switch requests
    pub fn pended(&self) -> u32 {
        self.pended.load(Ordering::Relaxed)
    }

    /// TCB handed to the last bootstrap
    pub fn first(&self) -> Option<NonNull<OsTcb>> {
        NonNull::new(self.first.load(Ordering::Relaxed))
    }

    /// Whether the last bootstrap was entered inside a critical section
    pub fn masked_at_bootstrap(&self) -> bool {
        self.masked.load(Ordering::Relaxed)
    }
}

impl Default for HostPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HostPort {
    unsafe fn bootstrap(&self, cs: CriticalSection, first: NonNull<OsTcb>) {
        self.masked.store(CriticalSection::is_active(), Ordering::Relaxed);
        self.first.store(first.as_ptr(), Ordering::Relaxed);
        self.bootstraps.fetch_add(1, Ordering::Relaxed);
        drop(cs);
    }

    fn request_switch(&self) {
        self.pended.fetch_add(1, Ordering::Relaxed);
    }
}
