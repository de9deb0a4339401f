//! Task entry contract and the error trap
//!
//! A task is nothing but an entry function and one opaque argument baked
//! into its TCB's initial frame. There is no task ID or name.

mod tcb;

pub use tcb::OsTcb;

/// Task entry point function type
///
/// Tasks are expected never to return. One that does lands in
/// [`os_task_return`].
pub type TaskFn = extern "C" fn(*mut ());

/// Entry function plus argument, the whole identity of a task
#[derive(Debug, Clone, Copy)]
pub struct TaskEntry {
    pub func: TaskFn,
    pub arg: *mut (),
}

impl TaskEntry {
    /// Task with a null argument
    pub const fn new(func: TaskFn) -> Self {
        TaskEntry {
            func,
            arg: core::ptr::null_mut(),
        }
    }

    /// Task with an argument pointer
    pub const fn with_arg(func: TaskFn, arg: *mut ()) -> Self {
        TaskEntry { func, arg }
    }

    /// Code address of the entry, truncated to the target word
    #[inline]
    pub fn addr(&self) -> u32 {
        self.func as usize as u32
    }

    /// Argument pointer, truncated to the target word
    #[inline]
    pub fn arg_word(&self) -> u32 {
        self.arg as usize as u32
    }
}

unsafe impl Send for TaskEntry {}

/// Error trap placed in the return-address slot of every initial frame.
///
/// A task that returns halts here instead of running off its stack.
#[no_mangle]
pub extern "C" fn os_task_return() -> ! {
    crate::error!("task returned from its entry function");
    loop {
        core::hint::spin_loop();
    }
}

/// Address of [`os_task_return`], truncated to the target word
#[inline]
pub fn exit_trap_addr() -> u32 {
    os_task_return as usize as u32
}
