// SPDX-License-Identifier: MPL-2.0

//! Waiting for child processes.

use super::{process_table, process_table::PROC_MAX, Pid, Process};
use crate::prelude::*;

bitflags! {
    /// Option bits of `waitpid`; recognized but all unsupported.
    pub struct WaitOptions: u32 {
        const WNOHANG = 0x1;
        const WUNTRACED = 0x2;
    }
}

/// Blocks until the child with PID `pid` has exited.
///
/// Only a direct child of the caller can be waited for, and only a plain
/// blocking wait is supported. The returned process is a zombie; the caller
/// reads its status and then reaps it with [`reap_child`].
pub fn wait_child_exit(pid: i32, options: WaitOptions) -> Result<Arc<Process>> {
    if !options.is_empty() {
        return_errno_with_message!(Errno::EINVAL, "wait options are not supported");
    }
    if pid <= 0 || pid as usize > PROC_MAX {
        return_errno_with_message!(Errno::ESRCH, "the process id is out of range");
    }

    let current = current!();
    let child = process_table::get_process(pid as Pid).ok_or(Error::with_message(
        Errno::ESRCH,
        "no such process",
    ))?;
    let is_child = child
        .parent()
        .is_some_and(|parent| Arc::ptr_eq(&parent, &current));
    if !is_child {
        return_errno_with_message!(Errno::ECHILD, "the process is not a child of the caller");
    }

    // The child wakes this queue after publishing its zombie status, so a
    // woken waiter always observes the exit code.
    current
        .children_wait_queue()
        .wait_until(|| child.is_zombie().then_some(()));

    Ok(child)
}

/// Removes an exited child from the process table and from its parent,
/// releasing the process object. Returns the child's encoded wait status.
pub fn reap_child(child: &Arc<Process>) -> u32 {
    let exit_code = child.exit_code().unwrap();

    process_table::remove(child.pid());
    if let Some(parent) = child.parent() {
        parent.children().lock().remove(&child.pid());
    }
    *child.parent.lock() = Weak::new();

    exit_code
}
