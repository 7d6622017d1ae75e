// SPDX-License-Identifier: MPL-2.0

use ferrite_frame::cpu::UserContext;

use super::{process_vm::ProcessVm, Pid, Process};
use crate::{
    fs::{file_table::FileTable, fs_resolver::FsResolver},
    prelude::*,
    thread::{thread_table, Thread, Tid},
};

/// Assembles a process and its main thread.
pub struct ProcessBuilder<'a> {
    pid: Pid,
    executable_path: &'a str,
    parent: Weak<Process>,
    main_thread_ctx: Option<UserContext>,
    process_vm: Option<ProcessVm>,
    file_table: Option<FileTable>,
    fs: Option<FsResolver>,
}

impl<'a> ProcessBuilder<'a> {
    pub fn new(pid: Pid, executable_path: &'a str, parent: Weak<Process>) -> Self {
        Self {
            pid,
            executable_path,
            parent,
            main_thread_ctx: None,
            process_vm: None,
            file_table: None,
            fs: None,
        }
    }

    pub fn main_thread_ctx(&mut self, ctx: UserContext) -> &mut Self {
        self.main_thread_ctx = Some(ctx);
        self
    }

    pub fn process_vm(&mut self, process_vm: ProcessVm) -> &mut Self {
        self.process_vm = Some(process_vm);
        self
    }

    pub fn file_table(&mut self, file_table: FileTable) -> &mut Self {
        self.file_table = Some(file_table);
        self
    }

    pub fn fs(&mut self, fs: FsResolver) -> &mut Self {
        self.fs = Some(fs);
        self
    }

    /// Builds the process, registers its main thread, and marks it
    /// runnable. The caller still owns table insertion and startup.
    pub fn build(self) -> Result<Arc<Process>> {
        let Self {
            pid,
            executable_path,
            parent,
            main_thread_ctx,
            process_vm,
            file_table,
            fs,
        } = self;

        let ctx = main_thread_ctx.unwrap_or_default();
        let file_table = file_table.unwrap_or_else(FileTable::new_with_stdio);
        let fs = fs.unwrap_or_else(FsResolver::new);

        let process = Arc::new(Process::new(
            pid,
            parent,
            executable_path.to_string(),
            process_vm,
            file_table,
            fs,
        ));

        let thread = Thread::new(pid as Tid, Arc::downgrade(&process), ctx);
        process.threads().lock().push(thread.clone());
        thread_table::add_thread(thread);

        process.set_runnable();
        Ok(process)
    }
}
