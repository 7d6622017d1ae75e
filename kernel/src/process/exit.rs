// SPDX-License-Identifier: MPL-2.0

//! Terminating the current process.

use super::TermStatus;
use crate::prelude::*;

/// Terminates the current process with `term_status`.
///
/// Resources that reach outside the process are put back first: the
/// address space is destroyed, the working-directory reference released,
/// and every descriptor slot swept, each release possibly closing the
/// underlying object. Only then is the termination status published and
/// the parent woken; the emptied process object stays in the process table
/// as a zombie until a `waitpid` reaps it.
pub fn do_exit(term_status: TermStatus) {
    let Some(current_thread) = current_thread!() else {
        panic!("exit from a thread the kernel does not manage");
    };
    current_thread.exit();

    let current = current!();
    debug!(
        "process {} exits with {:?}",
        current.pid(),
        term_status
    );

    // Release the address space.
    current.process_vm().lock().take();

    // Release the working directory.
    current.fs().lock().take();

    // Sweep the file table; dropping the last reference to an open file
    // closes it.
    let closed_files = current.file_table().lock().close_all();
    drop(closed_files);

    current.set_zombie(term_status);
    if let Some(parent) = current.parent() {
        parent.children_wait_queue().wake_all();
    }

    let tid = current_thread.tid();
    current.threads().lock().retain(|thread| thread.tid() != tid);
}
