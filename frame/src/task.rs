// SPDX-License-Identifier: MPL-2.0

//! The scheduling seam.
//!
//! The kernel does not schedule threads itself; a scheduler backend is
//! registered once at boot and provides thread identity, thread creation,
//! and the park/unpark primitives the [`WaitQueue`] is built on.
//!
//! [`WaitQueue`]: crate::sync::WaitQueue

use alloc::boxed::Box;

use spin::Once;

/// Kernel thread identifier.
pub type Tid = u32;

/// The interface a scheduler backend implements.
///
/// `park` blocks the calling thread until some other thread `unpark`s it.
/// A wakeup that arrives before the matching `park` must not be lost: the
/// next `park` of that thread returns immediately instead of blocking.
pub trait Scheduler: Send + Sync {
    /// The identifier of the calling thread, or `None` if the caller is not
    /// a scheduler-managed thread.
    fn current_tid(&self) -> Option<Tid>;

    /// Starts a new thread running `entry`, identified by `tid`.
    fn spawn(&self, tid: Tid, entry: Box<dyn FnOnce() + Send + 'static>);

    /// Blocks the calling thread until it is unparked.
    fn park(&self);

    /// Unparks the thread identified by `tid`.
    ///
    /// Unparking a thread that has already terminated is a no-op.
    fn unpark(&self, tid: Tid);

    /// Yields the CPU to another runnable thread.
    fn yield_now(&self);
}

static SCHEDULER: Once<&'static dyn Scheduler> = Once::new();

/// Registers the scheduler backend. Must be called exactly once, before any
/// thread is spawned.
pub fn set_scheduler(scheduler: &'static dyn Scheduler) {
    SCHEDULER.call_once(|| scheduler);
}

/// Returns the registered scheduler backend.
///
/// # Panics
///
/// Panics if no scheduler has been registered.
pub fn scheduler() -> &'static dyn Scheduler {
    *SCHEDULER.get().expect("no scheduler backend is registered")
}
