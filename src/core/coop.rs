//! Cooperative kernel state
//!
//! There is no scheduler process on the cooperative target. A task runs
//! its bounded loop, checkpointing as it goes, then asks for a successor
//! to be spawned and is replaced by it for good. Which task follows which
//! is data ([`Rotation`]) handed to the replace operation, not knowledge
//! baked into task bodies.

use core::ptr::NonNull;

use crate::config::{CFG_RING_SIZE, CFG_RING_SLOT};
use crate::core::cs_cell::CsCell;
use crate::core::current::CurrentTcb;
use crate::critical::critical_section;
use crate::ring::{RingTcb, TcbRing};
use crate::task::TaskFn;

/// Cooperative kernel instance
///
/// `current` must stay the first field; the AVR transport addresses it
/// through the kernel's symbol.
#[repr(C)]
pub struct CoopKernel<const CAP: usize, const SLOT: usize> {
    current: CurrentTcb<RingTcb>,
    ring: CsCell<TcbRing<CAP, SLOT>>,
}

/// Kernel with the configured ring geometry
pub type DefaultCoop = CoopKernel<CFG_RING_SIZE, CFG_RING_SLOT>;

const _: () = assert!(core::mem::offset_of!(DefaultCoop, current) == 0);

/// Global cooperative kernel instance
#[no_mangle]
pub static COOP: DefaultCoop = CoopKernel::new();

impl<const CAP: usize, const SLOT: usize> CoopKernel<CAP, SLOT> {
    pub const fn new() -> Self {
        CoopKernel {
            current: CurrentTcb::new(),
            ring: CsCell::new(TcbRing::new()),
        }
    }

    /// Allocate a TCB for `entry(arg)` and make it current.
    ///
    /// Selecting the new TCB is the whole scheduling decision; the caller
    /// restores it next.
    pub fn spawn(&self, entry: u16, arg: u16) -> NonNull<RingTcb> {
        critical_section(|cs| {
            let tcb = self.ring.get(cs).create(entry, arg);
            self.current.set(cs, tcb);
            crate::debug!("spawned task at {=u16:#x}", entry);
            tcb
        })
    }

    /// TCB whose frame is live in the CPU
    #[inline]
    pub fn current(&self) -> Option<NonNull<RingTcb>> {
        self.current.get()
    }

    /// Inspect the ring
    pub fn with_ring<R>(&self, f: impl FnOnce(&TcbRing<CAP, SLOT>) -> R) -> R {
        critical_section(|cs| f(self.ring.get(cs)))
    }
}

impl<const CAP: usize, const SLOT: usize> Default for CoopKernel<CAP, SLOT> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed hand-over order between cooperative tasks
///
/// Task `i` is followed by task `i + 1`, the last by the first.
pub struct Rotation<const N: usize> {
    tasks: [TaskFn; N],
}

impl<const N: usize> Rotation<N> {
    pub const fn new(tasks: [TaskFn; N]) -> Self {
        const { assert!(N > 0, "empty rotation") };
        Rotation { tasks }
    }

    /// Index of the task following `index`
    #[inline]
    pub const fn successor(&self, index: usize) -> usize {
        (index + 1) % N
    }

    /// Entry of the task following `index`
    #[inline]
    pub fn after(&self, index: usize) -> TaskFn {
        self.tasks[self.successor(index)]
    }

    /// Entry of task `index`
    #[inline]
    pub fn get(&self, index: usize) -> TaskFn {
        self.tasks[index]
    }

    /// Number of tasks in the rotation
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }
}
