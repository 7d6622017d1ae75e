// SPDX-License-Identifier: MPL-2.0

use alloc::{collections::VecDeque, sync::Arc};
use core::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
};

use super::SpinLock;
use crate::task::{scheduler, Tid};

/// A wait queue.
///
/// One may wait on a wait queue to put its executing thread to sleep.
/// Multiple threads may be the waiters of a wait queue. Other threads may
/// invoke the `wake`-family methods of a wait queue to wake up one or many
/// waiter threads.
pub struct WaitQueue {
    // A copy of `wakers.len()`, used for the lock-free fast path in
    // `wake_one` and `wake_all`.
    num_wakers: AtomicU32,
    wakers: SpinLock<VecDeque<Arc<Waker>>>,
}

impl WaitQueue {
    pub const fn new() -> Self {
        WaitQueue {
            num_wakers: AtomicU32::new(0),
            wakers: SpinLock::new(VecDeque::new()),
        }
    }

    /// Waits until some condition becomes true.
    ///
    /// This method takes a closure that tests a user-given condition and
    /// only returns once the condition returns `Some(_)`. A waker thread
    /// should first make the condition `Some(_)`, then invoke a
    /// `wake`-family method; that ordering guarantees the waiter cannot
    /// miss the update: the waker is enqueued before every re-check.
    pub fn wait_until<F, R>(&self, mut cond: F) -> R
    where
        F: FnMut() -> Option<R>,
    {
        if let Some(res) = cond() {
            return res;
        }

        let waiter = Waiter::new();
        let waker = waiter.waker();

        loop {
            self.enqueue(waker.clone());

            if let Some(res) = cond() {
                return res;
            }

            waiter.wait();
        }
    }

    /// Wakes up one waiting thread, if there is one.
    pub fn wake_one(&self) {
        if self.is_empty() {
            return;
        }

        loop {
            let mut wakers = self.wakers.lock();
            let Some(waker) = wakers.pop_front() else {
                break;
            };
            self.num_wakers.fetch_sub(1, Ordering::Release);
            // Avoid holding the lock when waking.
            drop(wakers);

            if waker.wake_up() {
                return;
            }
        }
    }

    /// Wakes up all waiting threads.
    pub fn wake_all(&self) {
        if self.is_empty() {
            return;
        }

        loop {
            let mut wakers = self.wakers.lock();
            let Some(waker) = wakers.pop_front() else {
                break;
            };
            self.num_wakers.fetch_sub(1, Ordering::Release);
            drop(wakers);

            waker.wake_up();
        }
    }

    fn is_empty(&self) -> bool {
        self.num_wakers.load(Ordering::Acquire) == 0
    }

    fn enqueue(&self, waker: Arc<Waker>) {
        let mut wakers = self.wakers.lock();
        wakers.push_back(waker);
        self.num_wakers.fetch_add(1, Ordering::Release);
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A waiter that can put the current thread to sleep until woken up through
/// the associated [`Waker`].
///
/// A waiter belongs to the thread that created it, so it is neither `Send`
/// nor `Sync`; only its waker travels between threads.
pub struct Waiter {
    waker: Arc<Waker>,
    _not_send_sync: PhantomData<*const ()>,
}

impl Waiter {
    /// Creates a waiter for the current thread and its associated [`Waker`].
    pub fn new() -> Self {
        let tid = scheduler()
            .current_tid()
            .expect("only scheduler-managed threads may wait");
        Self {
            waker: Arc::new(Waker {
                has_woken: AtomicBool::new(false),
                tid,
            }),
            _not_send_sync: PhantomData,
        }
    }

    /// Blocks until [`Waker::wake_up`] is called on the associated waker.
    ///
    /// Returns immediately if the waker has been woken since the end of the
    /// last call to this method.
    pub fn wait(&self) {
        self.waker.do_wait();
    }

    pub fn waker(&self) -> Arc<Waker> {
        self.waker.clone()
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        // Close the waker so late wake-ups against a dead waiter are no-ops.
        self.waker.close();
    }
}

/// Wakes up the thread that owns the associated [`Waiter`].
pub struct Waker {
    has_woken: AtomicBool,
    tid: Tid,
}

impl Waker {
    /// Wakes up the associated waiter.
    ///
    /// Returns `true` if the waiter was woken by this call, and `false` if
    /// it had already been woken and has not slept since, or has been
    /// dropped.
    pub fn wake_up(&self) -> bool {
        if self.has_woken.swap(true, Ordering::AcqRel) {
            return false;
        }

        scheduler().unpark(self.tid);
        true
    }

    fn do_wait(&self) {
        while !self.has_woken.load(Ordering::Acquire) {
            scheduler().park();
        }

        self.has_woken.store(false, Ordering::Release);
    }

    fn close(&self) {
        self.has_woken.store(true, Ordering::Release);
    }
}
