//! Scheduler and CPU hooks for the console on a single-CPU kernel.
//!
//! The kernel runs one process (the boot shell). A reader sleeps by halting
//! until an interrupt bumps the wake-up generation.

use core::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use kestrel_console::{Platform, WaitChannel};
use kestrel_hal::InterruptController;
use spin::{Mutex, MutexGuard};
use x86_64::instructions::interrupts;

use crate::arch::x86_64::{self as arch, pic::Pic};

/// Process ID of the boot shell.
const INIT_PID: u32 = 1;

/// Scheduling state of the boot shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum ProcState {
    Running = 0,
    Sleeping = 1,
}

/// [`Platform`] implementation for the kernel.
pub struct KernelPlatform {
    /// Bumped by every wake-up.
    generation: AtomicU64,
    killed: AtomicBool,
    state: AtomicU8,
}

impl KernelPlatform {
    /// Creates the platform with the shell running.
    pub const fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            killed: AtomicBool::new(false),
            state: AtomicU8::new(ProcState::Running as u8),
        }
    }

    /// Marks the shell for termination.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Clears the termination mark after the shell restarts.
    pub fn revive(&self) {
        self.killed.store(false, Ordering::SeqCst);
    }

    fn set_state(&self, state: ProcState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl Default for KernelPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for KernelPlatform {
    // Single CPU and one kind of sleeper, so the channel is not distinguished.
    fn sleep<'a, T>(
        &self,
        _chan: WaitChannel,
        guard: MutexGuard<'a, T>,
        lock: &'a Mutex<T>,
    ) -> MutexGuard<'a, T> {
        let seen = self.generation.load(Ordering::SeqCst);
        self.set_state(ProcState::Sleeping);
        drop(guard);

        while self.generation.load(Ordering::SeqCst) == seen && !self.killed() {
            // sti;hlt is atomic: a wake-up between the check and the halt
            // still ends the halt.
            interrupts::enable_and_hlt();
            interrupts::disable();
        }

        self.set_state(ProcState::Running);
        lock.lock()
    }

    fn wakeup(&self, _chan: WaitChannel) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    fn proc_dump(&self) {
        let state = if self.state.load(Ordering::SeqCst) == ProcState::Sleeping as u8 {
            "sleep "
        } else {
            "run   "
        };
        let mark = if self.killed() { " (killed)" } else { "" };
        crate::println!("\n{} {} init{}", INIT_PID, state, mark);
    }

    fn cpu_id(&self) -> u32 {
        arch::cpu_id()
    }

    fn caller_pcs(&self, pcs: &mut [usize]) {
        arch::caller_pcs(pcs);
    }

    fn halt(&self) {
        Pic.disable();
        arch::halt_loop();
    }
}
