// SPDX-License-Identifier: MPL-2.0

//! Kernel threads hosting user processes.

pub mod task;
pub mod thread_table;

pub use ferrite_frame::task::Tid;
use ferrite_frame::{cpu::UserContext, task::scheduler};

use crate::{prelude::*, process::Process};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadStatus {
    Init,
    Running,
    Exited,
}

/// A kernel thread bound to a user process.
///
/// Each user process has exactly one thread; its identifier equals the
/// process identifier.
pub struct Thread {
    tid: Tid,
    process: Weak<Process>,
    status: Mutex<ThreadStatus>,
    /// The user CPU state the thread starts from.
    init_ctx: Mutex<UserContext>,
}

impl Thread {
    pub fn new(tid: Tid, process: Weak<Process>, init_ctx: UserContext) -> Arc<Self> {
        Arc::new(Self {
            tid,
            process,
            status: Mutex::new(ThreadStatus::Init),
            init_ctx: Mutex::new(init_ctx),
        })
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    pub fn process(&self) -> Option<Arc<Process>> {
        self.process.upgrade()
    }

    pub fn is_exited(&self) -> bool {
        *self.status.lock() == ThreadStatus::Exited
    }

    /// Marks the thread as exited; the task loop tears it down on the next
    /// turn.
    pub fn exit(&self) {
        *self.status.lock() = ThreadStatus::Exited;
    }

    pub(crate) fn init_ctx(&self) -> UserContext {
        *self.init_ctx.lock()
    }

    /// Hands the thread to the scheduler.
    pub fn run(self: &Arc<Self>) {
        *self.status.lock() = ThreadStatus::Running;
        scheduler().spawn(self.tid, task::create_user_task(self.clone()));
    }
}

/// Returns the thread the caller runs on, if it is a kernel-managed one.
pub fn current_thread() -> Option<Arc<Thread>> {
    let tid = scheduler().current_tid()?;
    thread_table::get_thread(tid)
}
