//! Two-way round robin scheduler
//!
//! No ready queue and no priorities: a counter bumped on every switch
//! request, odd counts select TCB A and even counts select TCB B. The
//! kernel boots straight into B, so the first decision moves to A and the
//! sequence alternates A, B, A, B, ... from there.

/// One of the two preemptive TCBs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskSlot {
    A = 0,
    B = 1,
}

impl TaskSlot {
    /// Slot running right after bootstrap
    pub const INITIAL: TaskSlot = TaskSlot::B;

    /// Index into the TCB store
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The other slot
    #[inline]
    pub const fn other(self) -> TaskSlot {
        match self {
            TaskSlot::A => TaskSlot::B,
            TaskSlot::B => TaskSlot::A,
        }
    }
}

/// Scheduler state
#[derive(Debug, Default)]
pub struct PairScheduler {
    count: u8,
}

impl PairScheduler {
    pub const fn new() -> Self {
        PairScheduler { count: 0 }
    }

    /// Pick the TCB to run after this switch request.
    ///
    /// The counter wraps at 256, which keeps its parity sequence intact.
    #[inline]
    pub fn next(&mut self) -> TaskSlot {
        self.count = self.count.wrapping_add(1);
        if self.count % 2 == 1 {
            TaskSlot::A
        } else {
            TaskSlot::B
        }
    }

    /// Switch requests seen so far, modulo 256
    #[inline]
    pub fn count(&self) -> u8 {
        self.count
    }
}
