// SPDX-License-Identifier: MPL-2.0

//! Synchronization primitives.
//!
//! Lock types come from the `spin` crate; the `SpinLock` alias marks locks
//! that guard short, non-blocking critical sections, as opposed to `Mutex`es
//! that may be held across vnode I/O. Blocking waits go through
//! [`WaitQueue`], never through a lock.

mod wait;

pub use spin::{Mutex, MutexGuard, Once, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use wait::{WaitQueue, Waiter, Waker};

/// A lock for short critical sections that must not contain blocking calls.
pub type SpinLock<T> = spin::Mutex<T>;
pub type SpinLockGuard<'a, T> = spin::MutexGuard<'a, T>;
