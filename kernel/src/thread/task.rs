// SPDX-License-Identifier: MPL-2.0

//! The per-thread loop between user mode and the kernel.

use ferrite_frame::{
    cpu::UserContext,
    user::{user_mode, ReturnReason},
};

use super::{thread_table, Thread};
use crate::{
    prelude::*,
    process::{do_exit, TermStatus},
    syscall::handle_syscall,
};

/// The signal-style status a faulting process terminates with.
const FAULT_SIGNAL: u8 = 11;

pub(crate) fn create_user_task(thread: Arc<Thread>) -> Box<dyn FnOnce() + Send + 'static> {
    Box::new(move || user_task_entry(thread))
}

fn user_task_entry(thread: Arc<Thread>) {
    let mut ctx = thread.init_ctx();

    if let Some(vm_space) = thread.process().and_then(|process| process.vm_space()) {
        vm_space.activate();
    }

    loop {
        match user_mode().execute(&mut ctx) {
            ReturnReason::UserSyscall => handle_syscall(&mut ctx),
            ReturnReason::UserException => handle_user_exception(&ctx),
        }
        if thread.is_exited() {
            break;
        }
    }

    thread_table::remove_thread(thread.tid());
}

fn handle_user_exception(ctx: &UserContext) {
    warn!(
        "killing the current process: unrecoverable user fault at {:#x}",
        ctx.instruction_pointer()
    );
    do_exit(TermStatus::Killed(FAULT_SIGNAL));
}
