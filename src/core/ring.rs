//! Ring allocator for cooperative TCBs
//!
//! One static byte arena, carved into consecutive (stack, header) pairs
//! by a cursor that advances one slot per allocation and jumps back to
//! the start before it runs out of room. Nothing is freed: a slot dies
//! when the cursor comes round and overwrites it.
//!
//! Slot geometry for a cursor value `p`:
//!
//! ```text
//!   [p - SLOT ..= p]   stack, grows down from p
//!   [p + SLOT ..]      RingTcb header
//! ```
//!
//! The next allocation's stack top is `p + SLOT`, the byte where this
//! allocation's header starts. Building the next frame therefore
//! overwrites the previous header. That is harmless only while the owner
//! of the previous slot is the task creating its successor and never
//! comes back; a task suspended in an old slot across a wrap is not
//! supported.

use core::ptr::NonNull;

use crate::frame::{avr, StackTop};
use crate::types::OsStkByte;

/// Header of a cooperative TCB
///
/// `stk_ptr` must stay the first field; the AVR transport stores and
/// loads `SP` at offset zero.
#[repr(C)]
#[derive(Debug)]
pub struct RingTcb {
    /// Saved stack pointer
    pub stk_ptr: *mut OsStkByte,
    /// Highest byte of the stack region
    pub stk_base: *mut OsStkByte,
}

const _: () = assert!(core::mem::offset_of!(RingTcb, stk_ptr) == 0);

/// Offsets of one carved slot within the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotLayout {
    /// Lowest byte the stack may reach
    pub stack_floor: usize,
    /// Byte the stack grows down from
    pub stack_top: usize,
    /// Start of the header
    pub header: usize,
}

#[repr(C, align(8))]
struct Arena<const CAP: usize>([OsStkByte; CAP]);

/// Ring of `CAP` bytes handing out `SLOT`-wide TCB slots
pub struct TcbRing<const CAP: usize, const SLOT: usize> {
    arena: Arena<CAP>,
    pos: usize,
    laps: u32,
}

impl<const CAP: usize, const SLOT: usize> TcbRing<CAP, SLOT> {
    const GEOMETRY: () = {
        assert!(SLOT > avr::FRAME_LEN, "slot cannot hold an initial frame");
        assert!(SLOT >= core::mem::size_of::<RingTcb>(), "slot narrower than a header");
        assert!(SLOT % core::mem::align_of::<RingTcb>() == 0, "slot breaks header alignment");
        assert!(CAP >= 3 * SLOT, "arena holds no complete slot");
    };

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::GEOMETRY;
        TcbRing {
            arena: Arena([0; CAP]),
            pos: SLOT,
            laps: 0,
        }
    }

    /// Reserve the next slot and advance the cursor.
    pub fn carve(&mut self) -> SlotLayout {
        let stack_top = self.pos;
        let layout = SlotLayout {
            stack_floor: stack_top - SLOT,
            stack_top,
            header: stack_top + SLOT,
        };

        self.pos += SLOT;
        if self.pos >= CAP - 2 * SLOT {
            self.pos = SLOT;
            self.laps = self.laps.wrapping_add(1);
            crate::warn!("tcb ring wrapped, lap {=u32}", self.laps);
        }

        layout
    }

    /// Carve a slot and initialise a TCB in it for `entry(arg)`.
    ///
    /// `entry` and `arg` are target code and data addresses.
    pub fn create(&mut self, entry: u16, arg: u16) -> NonNull<RingTcb> {
        let layout = self.carve();

        let stack = &mut self.arena.0[layout.stack_floor..=layout.stack_top];
        let sp = avr::build(stack, entry, arg);

        let base = self.arena.0.as_mut_ptr();
        let tcb = RingTcb {
            stk_ptr: base.wrapping_add(layout.stack_floor + sp.index()),
            stk_base: base.wrapping_add(layout.stack_top),
        };

        let header = base.wrapping_add(layout.header) as *mut RingTcb;
        debug_assert!(layout.header + core::mem::size_of::<RingTcb>() <= CAP);
        debug_assert!(header.is_aligned());
        // In bounds and aligned per GEOMETRY.
        unsafe {
            header.write(tcb);
            NonNull::new_unchecked(header)
        }
    }

    /// Saved stack pointer of `tcb` as an index into [`Self::bytes`]
    pub fn stack_top_of(&self, tcb: NonNull<RingTcb>) -> StackTop {
        let sp = unsafe { tcb.as_ref().stk_ptr } as usize;
        let offset = sp.wrapping_sub(self.arena.0.as_ptr() as usize);
        debug_assert!(offset < CAP, "tcb not carved from this ring");
        StackTop::new(offset)
    }

    /// Cursor position, the stack top of the next allocation
    #[inline]
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Number of times the cursor has wrapped
    #[inline]
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Raw arena contents
    #[inline]
    pub fn bytes(&self) -> &[OsStkByte] {
        &self.arena.0
    }

    /// Byte offset of `ptr` within the arena, if it points inside it
    pub fn offset_of(&self, ptr: *const OsStkByte) -> Option<usize> {
        let base = self.arena.0.as_ptr() as usize;
        let addr = ptr as usize;
        (base..base + CAP).contains(&addr).then(|| addr - base)
    }
}

impl<const CAP: usize, const SLOT: usize> Default for TcbRing<CAP, SLOT> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for RingTcb {}
