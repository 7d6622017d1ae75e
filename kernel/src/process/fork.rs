// SPDX-License-Identifier: MPL-2.0

//! Duplicating the current process.

use ferrite_frame::cpu::UserContext;

use super::{process_table, process_vm::ProcessVm, Pid, Process, ProcessBuilder};
use crate::prelude::*;

/// Creates a child process that is a copy of the caller.
///
/// The child gets a deep copy of the address space, a file table whose
/// slots share the parent's open files, the parent's working directory,
/// and a CPU context identical to `parent_ctx` except that its syscall
/// return value reads zero. The parent receives the child's PID.
pub fn fork_child(parent_ctx: &UserContext) -> Result<Pid> {
    let current = current!();

    let child_pid = process_table::allocate_pid()?;

    let result = clone_child_process(&current, child_pid, parent_ctx);
    let child = match result {
        Ok(child) => child,
        Err(err) => {
            // Undo the reservation; the half-built child and its inherited
            // references unwind with it.
            process_table::release_pid(child_pid);
            return Err(err);
        }
    };

    child.run();
    Ok(child_pid)
}

fn clone_child_process(
    current: &Arc<Process>,
    child_pid: Pid,
    parent_ctx: &UserContext,
) -> Result<Arc<Process>> {
    // Deep-copy the address space.
    let child_process_vm = {
        let process_vm = current.process_vm().lock();
        let parent_process_vm = process_vm.as_ref().ok_or(Error::with_message(
            Errno::EINVAL,
            "a process without an address space cannot fork",
        ))?;
        ProcessVm::fork_from(parent_process_vm)?
    };

    // Share every open file the parent has installed.
    let child_file_table = current.file_table().lock().clone();

    // Share the working directory object.
    let child_fs = current.with_fs(|fs| Ok(fs.clone()))?;

    // The child resumes where the parent trapped, seeing a zero return.
    let child_ctx = {
        let mut ctx = *parent_ctx;
        ctx.set_syscall_ret(0);
        ctx
    };

    let child = {
        let executable_path = current.executable_path();
        let mut process_builder =
            ProcessBuilder::new(child_pid, &executable_path, Arc::downgrade(current));
        process_builder
            .main_thread_ctx(child_ctx)
            .process_vm(child_process_vm)
            .file_table(child_file_table)
            .fs(child_fs);
        process_builder.build()?
    };

    current.children().lock().insert(child_pid, child.clone());
    process_table::insert(child_pid, child.clone());

    Ok(child)
}
