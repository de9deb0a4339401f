//! Preemptive kernel state
//!
//! Owns the two statically allocated TCBs, the scheduler and the current
//! TCB reference. The Cortex-M transport works on the global [`KERNEL`];
//! tests build their own instances.

use core::ptr::NonNull;

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{CFG_TASK_COUNT, CFG_TIME_SLICE_TICKS};
use crate::core::cs_cell::CsCell;
use crate::core::current::CurrentTcb;
use crate::critical::{critical_section, is_isr_context, CriticalSection};
use crate::error::{OsError, OsResult};
use crate::port::Transport;
use crate::sched::{PairScheduler, TaskSlot};
use crate::task::{OsTcb, TaskEntry};
use crate::types::{OsSwitchCtr, OsTick};

/// Kernel instance
///
/// `current` must stay the first field; the transport addresses it
/// through the kernel's symbol.
#[repr(C)]
pub struct Kernel {
    current: CurrentTcb<OsTcb>,
    sched: CsCell<PairScheduler>,
    tcbs: [CsCell<OsTcb>; CFG_TASK_COUNT],
    running: AtomicBool,
    switches: AtomicU32,
    ticks: AtomicU32,
}

const _: () = assert!(core::mem::offset_of!(Kernel, current) == 0);

/// Global kernel instance
#[no_mangle]
pub static KERNEL: Kernel = Kernel::new();

impl Kernel {
    pub const fn new() -> Self {
        Kernel {
            current: CurrentTcb::new(),
            sched: CsCell::new(PairScheduler::new()),
            tcbs: [CsCell::new(OsTcb::new()), CsCell::new(OsTcb::new())],
            running: AtomicBool::new(false),
            switches: AtomicU32::new(0),
            ticks: AtomicU32::new(0),
        }
    }

    /// Start multitasking
    ///
    /// Builds both initial frames, publishes TCB B as current and hands
    /// the CPU to the transport. On hardware this does not return.
    /// Interrupts stay masked from the first frame write until the
    /// transport has the first task running.
    ///
    /// # Returns
    /// * `Err(OsError::OsRunning)` - already started
    /// * `Err(OsError::StartIsr)` - called from an interrupt handler
    pub fn start<P: Transport>(&'static self, port: &P, tasks: [TaskEntry; CFG_TASK_COUNT]) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::StartIsr);
        }

        if self.is_running() {
            return Err(OsError::OsRunning);
        }
        crate::info!("starting scheduler");

        let cs = CriticalSection::enter();
        if self.is_running() {
            return Err(OsError::OsRunning);
        }

        for (tcb, task) in self.tcbs.iter().zip(tasks) {
            tcb.get(&cs).init(task);
        }

        let first = self.tcb(TaskSlot::INITIAL);
        self.current.set(&cs, first);
        self.running.store(true, Ordering::Release);

        unsafe { port.bootstrap(cs, first) };

        Ok(())
    }

    /// Select the next TCB and publish it as current.
    ///
    /// Called by the transport after the departing task's registers have
    /// been saved and before the next task's are restored.
    #[inline]
    pub fn switch_context(&self) -> NonNull<OsTcb> {
        self.switch_context_with(|| {})
    }

    /// [`Self::switch_context`] with `between` run after the decision and
    /// before it is published.
    ///
    /// `between` stands in for an interrupt landing mid-update; host tests
    /// use it to check what such an interrupt can observe.
    #[doc(hidden)]
    pub fn switch_context_with(&self, between: impl FnOnce()) -> NonNull<OsTcb> {
        critical_section(|cs| {
            let slot = self.sched.get(cs).next();
            let next = self.tcb(slot);
            between();
            self.current.set(cs, next);
            self.switches.fetch_add(1, Ordering::Relaxed);
            crate::trace!("switch to slot {}", slot);
            next
        })
    }

    /// Ask the transport for a deferred switch.
    pub fn request_switch<P: Transport>(&self, port: &P) -> OsResult<()> {
        if !self.is_running() {
            return Err(OsError::OsNotRunning);
        }
        port.request_switch();
        Ok(())
    }

    /// Advance the tick counter, pending a switch at each slice boundary.
    ///
    /// Returns the new tick count. Ticks before start are ignored.
    pub fn tick<P: Transport>(&self, port: &P) -> OsTick {
        if !self.is_running() {
            return self.tick_get();
        }

        let now = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if now % CFG_TIME_SLICE_TICKS == 0 {
            port.request_switch();
        }
        now
    }

    /// TCB whose frame is live in the CPU
    #[inline]
    pub fn current(&self) -> Option<NonNull<OsTcb>> {
        self.current.get()
    }

    /// Which slot a TCB pointer belongs to
    pub fn slot_of(&self, tcb: NonNull<OsTcb>) -> Option<TaskSlot> {
        [TaskSlot::A, TaskSlot::B]
            .into_iter()
            .find(|slot| self.tcb(*slot) == tcb)
    }

    /// Address of the TCB in `slot`
    #[inline]
    pub fn tcb(&self, slot: TaskSlot) -> NonNull<OsTcb> {
        // Pointer into our own storage, never null.
        unsafe { NonNull::new_unchecked(self.tcbs[slot.index()].as_ptr()) }
    }

    /// Completed scheduler decisions
    #[inline]
    pub fn switch_count(&self) -> OsSwitchCtr {
        self.switches.load(Ordering::Relaxed)
    }

    /// Current tick count
    #[inline]
    pub fn tick_get(&self) -> OsTick {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Whether the scheduler has been started
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
