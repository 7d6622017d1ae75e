// SPDX-License-Identifier: MPL-2.0

use super::{
    exec::load_program_into,
    process_table,
    process_vm::ProcessVm,
    status::{ProcessStatus, TermStatus},
    ProcessBuilder,
};
use crate::{
    fs::{file_table::FileTable, fs_resolver::FsResolver},
    prelude::*,
    thread::Thread,
};

/// Process id.
pub type Pid = u32;

/// The raw value a process exits with.
pub type ExitCode = i32;

/// A user process.
pub struct Process {
    // Immutable part
    pid: Pid,

    /// Wakes a parent blocked in `waitpid` when a child changes state.
    children_wait_queue: WaitQueue,

    // Mutable part
    /// The executable path.
    executable_path: RwLock<String>,
    /// The user-memory image; absent for kernel-only processes and after
    /// the process has exited.
    process_vm: Mutex<Option<ProcessVm>>,
    /// The threads of the process.
    threads: Mutex<Vec<Arc<Thread>>>,
    /// Process status.
    status: Mutex<ProcessStatus>,
    /// The parent process.
    pub(super) parent: Mutex<Weak<Process>>,
    /// Child processes, by PID.
    children: Mutex<BTreeMap<Pid, Arc<Process>>>,
    /// The descriptor table.
    file_table: Arc<Mutex<FileTable>>,
    /// The filesystem context (working directory); released at exit.
    fs: Mutex<Option<FsResolver>>,
}

impl Process {
    pub(super) fn new(
        pid: Pid,
        parent: Weak<Process>,
        executable_path: String,
        process_vm: Option<ProcessVm>,
        file_table: FileTable,
        fs: FsResolver,
    ) -> Self {
        Self {
            pid,
            children_wait_queue: WaitQueue::new(),
            executable_path: RwLock::new(executable_path),
            process_vm: Mutex::new(process_vm),
            threads: Mutex::new(Vec::new()),
            status: Mutex::new(ProcessStatus::Uninit),
            parent: Mutex::new(parent),
            children: Mutex::new(BTreeMap::new()),
            file_table: Arc::new(Mutex::new(file_table)),
            fs: Mutex::new(Some(fs)),
        }
    }

    /// Creates the initial user process from `path` and starts it.
    ///
    /// The new process gets console stdio, the filesystem root as its
    /// working directory, and no parent.
    pub fn spawn_user_process(path: &str, argv: Vec<CString>) -> Result<Arc<Self>> {
        let process = Self::create_user_process(path, argv)?;
        process.run();
        Ok(process)
    }

    fn create_user_process(path: &str, argv: Vec<CString>) -> Result<Arc<Self>> {
        let pid = process_table::allocate_pid()?;

        let create = || -> Result<Arc<Process>> {
            let fs = FsResolver::new();
            let process_vm = ProcessVm::alloc()?;
            let program = load_program_into(&fs, process_vm.vm_space(), path, argv)?;

            let mut ctx = ferrite_frame::cpu::UserContext::new();
            program.apply_to(&mut ctx);

            let mut process_builder = ProcessBuilder::new(pid, path, Weak::new());
            process_builder
                .main_thread_ctx(ctx)
                .process_vm(process_vm)
                .fs(fs);
            let process = process_builder.build()?;

            process_table::insert(pid, process.clone());
            Ok(process)
        };

        match create() {
            Ok(process) => Ok(process),
            Err(err) => {
                process_table::release_pid(pid);
                Err(err)
            }
        }
    }

    /// Starts the main thread of the process.
    pub fn run(&self) {
        let threads = self.threads.lock();
        // A process starts running with exactly one thread.
        debug_assert_eq!(threads.len(), 1);
        let thread = threads[0].clone();
        // Do not hold the lock while handing the thread to the scheduler.
        drop(threads);
        thread.run();
    }

    // *********** Basic structures ***********

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn executable_path(&self) -> String {
        self.executable_path.read().clone()
    }

    pub fn set_executable_path(&self, executable_path: String) {
        *self.executable_path.write() = executable_path;
    }

    pub fn threads(&self) -> &Mutex<Vec<Arc<Thread>>> {
        &self.threads
    }

    // *********** Parent and child ***********

    pub fn parent(&self) -> Option<Arc<Process>> {
        self.parent.lock().upgrade()
    }

    pub(super) fn children(&self) -> &Mutex<BTreeMap<Pid, Arc<Process>>> {
        &self.children
    }

    pub fn has_child(&self, pid: &Pid) -> bool {
        self.children.lock().contains_key(pid)
    }

    pub fn children_wait_queue(&self) -> &WaitQueue {
        &self.children_wait_queue
    }

    // ************** Virtual memory *************

    pub fn process_vm(&self) -> &Mutex<Option<ProcessVm>> {
        &self.process_vm
    }

    /// The current user address space, if the process has one.
    pub fn vm_space(&self) -> Option<Arc<dyn ferrite_frame::mm::VmSpace>> {
        self.process_vm
            .lock()
            .as_ref()
            .map(|vm| vm.vm_space().clone())
    }

    // ************** File system ****************

    pub fn file_table(&self) -> &Arc<Mutex<FileTable>> {
        &self.file_table
    }

    pub(crate) fn fs(&self) -> &Mutex<Option<FsResolver>> {
        &self.fs
    }

    /// Runs `f` against the filesystem context.
    pub fn with_fs<R>(&self, f: impl FnOnce(&FsResolver) -> Result<R>) -> Result<R> {
        let fs = self.fs.lock();
        let resolver = fs.as_ref().ok_or(Error::with_message(
            Errno::ESRCH,
            "the process has no filesystem context",
        ))?;
        f(resolver)
    }

    /// Runs `f` against the filesystem context, mutably.
    pub fn with_fs_mut<R>(&self, f: impl FnOnce(&mut FsResolver) -> Result<R>) -> Result<R> {
        let mut fs = self.fs.lock();
        let resolver = fs.as_mut().ok_or(Error::with_message(
            Errno::ESRCH,
            "the process has no filesystem context",
        ))?;
        f(resolver)
    }

    // ******************* Status ********************

    pub(super) fn set_runnable(&self) {
        *self.status.lock() = ProcessStatus::Runnable;
    }

    pub fn is_zombie(&self) -> bool {
        self.status.lock().is_zombie()
    }

    /// Publishes the termination status.
    ///
    /// # Panics
    ///
    /// Panics if the process has already exited; a second exit of the same
    /// process is a kernel bug.
    pub(super) fn set_zombie(&self, term_status: TermStatus) {
        let mut status = self.status.lock();
        assert!(
            !status.is_zombie(),
            "process {} exited twice",
            self.pid
        );
        *status = ProcessStatus::Zombie(term_status);
    }

    /// The encoded wait status, once the process has exited.
    pub fn exit_code(&self) -> Option<u32> {
        match &*self.status.lock() {
            ProcessStatus::Runnable | ProcessStatus::Uninit => None,
            ProcessStatus::Zombie(term_status) => Some(term_status.as_u32()),
        }
    }
}

/// Returns the current process.
///
/// # Panics
///
/// Panics if the current thread does not belong to a process.
pub fn current() -> Arc<Process> {
    let Some(current_thread) = crate::thread::current_thread() else {
        panic!("the current thread is not managed by the kernel");
    };
    match current_thread.process() {
        Some(process) => process,
        None => panic!("the current thread does not belong to a process"),
    }
}
