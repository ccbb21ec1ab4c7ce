//! Kernel services the console depends on.
//!
//! The console never schedules, kills or halts anything itself. It calls
//! out through [`Platform`], which the kernel implements over its scheduler
//! and CPU, and which tests implement over threads or plain counters.

use spin::{Mutex, MutexGuard};

/// Identifies what a sleeping thread waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitChannel(usize);

impl WaitChannel {
    /// Channel keyed by the address of `value`.
    pub fn of<T>(value: &T) -> Self {
        WaitChannel(value as *const T as usize)
    }

    /// Raw key.
    pub fn key(self) -> usize {
        self.0
    }
}

/// Scheduling, process and CPU hooks.
pub trait Platform {
    /// Atomically releases `guard`, suspends the caller until [`wakeup`] is
    /// called on `chan` (or the caller is killed), then re-acquires `lock`.
    ///
    /// Spurious returns are allowed; callers re-check their condition.
    ///
    /// [`wakeup`]: Platform::wakeup
    fn sleep<'a, T>(
        &self,
        chan: WaitChannel,
        guard: MutexGuard<'a, T>,
        lock: &'a Mutex<T>,
    ) -> MutexGuard<'a, T>;

    /// Wakes every thread sleeping on `chan`.
    fn wakeup(&self, chan: WaitChannel);

    /// Returns `true` if the calling process has been marked for termination.
    fn killed(&self) -> bool;

    /// Prints the process table. Called without the console lock held.
    fn proc_dump(&self);

    /// Identifier of the executing CPU.
    fn cpu_id(&self) -> u32;

    /// Fills `pcs` with the caller's return addresses, zero past the last frame.
    fn caller_pcs(&self, pcs: &mut [usize]);

    /// Stops the current CPU with interrupts disabled.
    ///
    /// On hardware this never returns.
    fn halt(&self);
}
