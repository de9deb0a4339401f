//! Preemptive kernel tests
//!
//! Drive the kernel through the recording host transport. Each test leaks
//! its own `Kernel` so tests stay independent of the global instance.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use twinos::config::CFG_TIME_SLICE_TICKS;
use twinos::critical::CriticalSection;
use twinos::frame::armv7m;
use twinos::port::HostPort;
use twinos::sched::TaskSlot;
use twinos::task::{exit_trap_addr, TaskEntry};
use twinos::{Kernel, OsError};

extern "C" fn job_a(_: *mut ()) {
    loop {
        std::hint::spin_loop();
    }
}

extern "C" fn job_b(_: *mut ()) {
    loop {
        std::hint::spin_loop();
    }
}

fn leak_kernel() -> &'static Kernel {
    Box::leak(Box::new(Kernel::new()))
}

fn started(port: &HostPort) -> &'static Kernel {
    let kernel = leak_kernel();
    kernel
        .start(port, [TaskEntry::new(job_a), TaskEntry::new(job_b)])
        .expect("start failed");
    kernel
}

#[test]
fn test_global_kernel_idle() {
    assert!(!twinos::KERNEL.is_running());
    assert!(twinos::KERNEL.current().is_none());
}

#[test]
fn test_start_boots_into_b() {
    let port = HostPort::new();
    let kernel = started(&port);

    assert!(kernel.is_running());
    assert_eq!(port.bootstraps(), 1);
    assert_eq!(port.first(), Some(kernel.tcb(TaskSlot::B)));
    assert_eq!(kernel.current(), Some(kernel.tcb(TaskSlot::B)));
    assert_eq!(kernel.switch_count(), 0);
}

#[test]
fn test_bootstrap_entered_masked() {
    let port = HostPort::new();
    let kernel = started(&port);

    assert!(port.masked_at_bootstrap());
    assert!(kernel.is_running());
}

#[test]
fn test_start_builds_both_frames() {
    let port = HostPort::new();
    let kernel = started(&port);

    for (slot, entry) in [(TaskSlot::A, job_a as usize), (TaskSlot::B, job_b as usize)] {
        let tcb = unsafe { kernel.tcb(slot).as_ref() };
        let ctx = armv7m::unstack(tcb.stack(), tcb.stack_top());

        assert_eq!(ctx.pc, entry as u32 & armv7m::START_ADDRESS_MASK);
        assert_eq!(ctx.lr, exit_trap_addr());
        assert_eq!(ctx.arg(), 0);
        assert_eq!(ctx.exc_return, armv7m::INITIAL_EXC_RETURN);
    }
}

#[test]
fn test_start_twice_fails() {
    let port = HostPort::new();
    let kernel = started(&port);

    let again = kernel.start(&port, [TaskEntry::new(job_b), TaskEntry::new(job_a)]);
    assert_eq!(again, Err(OsError::OsRunning));
    assert_eq!(port.bootstraps(), 1);
}

#[test]
fn test_request_switch_before_start() {
    let port = HostPort::new();
    let kernel = leak_kernel();

    assert_eq!(kernel.request_switch(&port), Err(OsError::OsNotRunning));
    assert_eq!(port.pended(), 0);

    kernel
        .start(&port, [TaskEntry::new(job_a), TaskEntry::new(job_b)])
        .unwrap();
    assert_eq!(kernel.request_switch(&port), Ok(()));
    assert_eq!(port.pended(), 1);
}

#[test]
fn test_tick_pends_on_slice_boundary() {
    let port = HostPort::new();
    let kernel = leak_kernel();

    // Ignored before start
    assert_eq!(kernel.tick(&port), 0);

    kernel
        .start(&port, [TaskEntry::new(job_a), TaskEntry::new(job_b)])
        .unwrap();

    for _ in 0..CFG_TIME_SLICE_TICKS * 3 - 1 {
        kernel.tick(&port);
    }
    assert_eq!(port.pended(), 2);

    assert_eq!(kernel.tick(&port), CFG_TIME_SLICE_TICKS * 3);
    assert_eq!(port.pended(), 3);
}

#[test]
fn test_alternation_from_initial_state() {
    let port = HostPort::new();
    let kernel = started(&port);

    let mut expected = TaskSlot::A;
    for n in 0..600u32 {
        let next = kernel.switch_context();
        assert_eq!(kernel.slot_of(next), Some(expected), "switch {n}");
        assert_eq!(kernel.current(), Some(next));
        expected = expected.other();
    }
    assert_eq!(kernel.switch_count(), 600);
}

#[test]
fn test_stacks_do_not_alias() {
    let port = HostPort::new();
    let kernel = started(&port);

    let a = unsafe { kernel.tcb(TaskSlot::A).as_ref() };
    let b = unsafe { kernel.tcb(TaskSlot::B).as_ref() };
    let (ra, rb) = (a.stack_range(), b.stack_range());

    assert!(ra.end <= rb.start || rb.end <= ra.start);
    assert!(ra.contains(&(a.stk_ptr as usize)));
    assert!(rb.contains(&(b.stk_ptr as usize)));
}

#[test]
fn test_round_robin_counters() {
    for k in [0usize, 1, 2, 7, 100, 513] {
        let port = HostPort::new();
        let kernel = started(&port);
        let mut counters = [0usize; 2];

        // Each switch event hands one unit of work to the selected task
        for _ in 0..k {
            let next = kernel.switch_context();
            let slot = kernel.slot_of(next).unwrap();
            counters[slot.index()] += 1;
        }

        assert_eq!(counters[TaskSlot::A.index()], k.div_ceil(2));
        assert_eq!(counters[TaskSlot::B.index()], k / 2);
        assert!(counters[0].abs_diff(counters[1]) <= 1);
    }
}

#[test]
fn test_current_never_torn_under_contention() {
    let port = HostPort::new();
    let kernel = started(&port);
    let valid = [
        kernel.tcb(TaskSlot::A).as_ptr() as usize,
        kernel.tcb(TaskSlot::B).as_ptr() as usize,
    ];
    let done = AtomicBool::new(false);
    const PER_THREAD: u32 = 5_000;

    thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                let seen = kernel.current().unwrap().as_ptr() as usize;
                assert!(valid.contains(&seen), "torn current: {seen:#x}");
            }
        });

        let switchers: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(move || {
                    for _ in 0..PER_THREAD {
                        let next = kernel.switch_context().as_ptr() as usize;
                        assert!(valid.contains(&next));
                    }
                })
            })
            .collect();

        for switcher in switchers {
            switcher.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });

    // Serialized decisions: the total count fixes the final selection
    assert_eq!(kernel.switch_count(), 2 * PER_THREAD);
    assert_eq!(kernel.current(), Some(kernel.tcb(TaskSlot::B)));
}

#[test]
fn test_request_mid_update_is_deferred() {
    let port = HostPort::new();
    let kernel = started(&port);
    let old = kernel.tcb(TaskSlot::B);

    let next = kernel.switch_context_with(|| {
        // Interrupt landing between decision and publish
        assert_eq!(kernel.current(), Some(old));
        assert_eq!(kernel.request_switch(&port), Ok(()));
        assert_eq!(kernel.current(), Some(old));
    });

    assert_eq!(kernel.slot_of(next), Some(TaskSlot::A));
    assert_eq!(kernel.current(), Some(next));
    assert_eq!(port.pended(), 1);
    assert_eq!(kernel.switch_count(), 1);
}

#[test]
fn test_nested_switch_mid_update_never_torn() {
    let port = HostPort::new();
    let kernel = started(&port);
    let valid = [kernel.tcb(TaskSlot::A), kernel.tcb(TaskSlot::B)];

    for _ in 0..64 {
        let before = kernel.current().unwrap();
        let nested = Cell::new(None);

        let outer = kernel.switch_context_with(|| {
            assert_eq!(kernel.current(), Some(before));
            let inner = kernel.switch_context();
            assert_eq!(kernel.current(), Some(inner));
            nested.set(Some(inner));
        });

        let inner = nested.get().unwrap();
        assert!(valid.contains(&inner));
        assert!(valid.contains(&outer));
        assert_ne!(inner, outer);
        assert_eq!(kernel.current(), Some(outer));
    }
    assert_eq!(kernel.switch_count(), 128);
}
