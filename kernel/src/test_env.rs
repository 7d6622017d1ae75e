// SPDX-License-Identifier: MPL-2.0

//! Host-side collaborator mocks.
//!
//! The subsystem under test is exercised end to end: mocked hardware and
//! platform components are registered through [`crate::init`], kernel
//! threads run on std threads, and "user programs" are scripted step
//! machines the mocked user-mode executor drives through real syscalls.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU32, AtomicU64, Ordering},
    sync::Mutex as StdMutex,
    thread,
    time::Duration,
};

use ferrite_frame::{
    cpu::UserContext,
    mm::{self, VmSpace},
    task::{Scheduler, Tid},
    user::{ReturnReason, UserMode},
    Vaddr,
};
use spin::Once;

use crate::{
    device::console::ConsoleDriver,
    fs::utils::CreationFlags,
    prelude::*,
    process::{process_table, Process},
    vfs::{Metadata, Vfs, Vnode, VnodeType},
    vm::VmProvider,
};

/// Where mock programs are entered.
pub const ENTRY_VADDR: Vaddr = 0x1000;
/// The top of the mock user stack; the flat memory ends here.
pub const STACK_TOP: Vaddr = 0x20_0000;

const USER_MEM_SIZE: usize = STACK_TOP;

// ------------------------------------------------------------------
// Scripted user programs
// ------------------------------------------------------------------

/// What a user program does when it gets the CPU.
pub enum UserStep {
    /// Trap into the kernel with the given syscall.
    Syscall { num: u64, args: [u64; 6] },
    /// Hit an unrecoverable fault.
    Fault,
}

/// One scheduling turn of a scripted program.
///
/// `step` counts the turns this address space has taken (fork duplicates
/// the counter with the space, exec resets it), `ctx` exposes the register
/// state including the last syscall's return value, and `mem` is the
/// program's own memory.
pub struct StepCtx<'a> {
    pub step: u64,
    pub ctx: &'a UserContext,
    pub mem: &'a MockVmSpace,
}

impl StepCtx<'_> {
    /// The last syscall's return value.
    pub fn ret(&self) -> isize {
        self.ctx.syscall_ret() as isize
    }

    /// Plants a nul-terminated string in program memory; returns `addr`.
    pub fn write_cstr(&self, addr: Vaddr, s: &str) -> u64 {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        self.mem.write_bytes(addr, &bytes).unwrap();
        addr as u64
    }

    /// Plants a null-terminated pointer array in program memory; returns
    /// `addr`.
    pub fn write_ptr_array(&self, addr: Vaddr, ptrs: &[u64]) -> u64 {
        for (i, ptr) in ptrs.iter().chain(core::iter::once(&0)).enumerate() {
            self.mem
                .write_bytes(addr + i * 8, &ptr.to_ne_bytes())
                .unwrap();
        }
        addr as u64
    }

    pub fn read_mem(&self, addr: Vaddr, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.mem.read_bytes(addr, &mut buf).unwrap();
        buf
    }

    pub fn read_u64(&self, addr: Vaddr) -> u64 {
        let mut bytes = [0u8; 8];
        self.mem.read_bytes(addr, &mut bytes).unwrap();
        u64::from_ne_bytes(bytes)
    }

    pub fn write_u64(&self, addr: Vaddr, val: u64) {
        self.mem.write_bytes(addr, &val.to_ne_bytes()).unwrap();
    }

    pub fn read_cstr(&self, addr: Vaddr) -> String {
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            self.mem.read_bytes(addr + bytes.len(), &mut byte).unwrap();
            if byte[0] == 0 {
                return String::from_utf8(bytes).unwrap();
            }
            bytes.push(byte[0]);
        }
    }
}

pub type ProgramFn = dyn Fn(&StepCtx) -> UserStep + Send + Sync;

/// Shorthand for a syscall step.
pub fn sys<const N: usize>(num: u64, args: [u64; N]) -> UserStep {
    let mut all = [0u64; 6];
    all[..N].copy_from_slice(&args);
    UserStep::Syscall { num, args: all }
}

// ------------------------------------------------------------------
// Mock address spaces
// ------------------------------------------------------------------

/// A flat in-memory user address space carrying its scripted program.
pub struct MockVmSpace {
    mem: Mutex<Vec<u8>>,
    program: Mutex<Option<Arc<ProgramFn>>>,
    step: AtomicU64,
}

impl MockVmSpace {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            mem: Mutex::new(vec![0u8; USER_MEM_SIZE]),
            program: Mutex::new(None),
            step: AtomicU64::new(0),
        })
    }

    fn fork_of(other: &Self) -> Arc<Self> {
        Arc::new(Self {
            mem: Mutex::new(other.mem.lock().clone()),
            program: Mutex::new(other.program.lock().clone()),
            step: AtomicU64::new(other.step.load(Ordering::Relaxed)),
        })
    }

    fn set_program(&self, program: Arc<ProgramFn>) {
        *self.program.lock() = Some(program);
        self.step.store(0, Ordering::Relaxed);
    }

    fn check_range(&self, va: Vaddr, len: usize) -> mm::Result<()> {
        if va.checked_add(len).is_none_or(|end| end > USER_MEM_SIZE) {
            return Err(mm::Error::PageFault);
        }
        Ok(())
    }
}

impl VmSpace for MockVmSpace {
    fn read_bytes(&self, va: Vaddr, buf: &mut [u8]) -> mm::Result<()> {
        self.check_range(va, buf.len())?;
        let mem = self.mem.lock();
        buf.copy_from_slice(&mem[va..va + buf.len()]);
        Ok(())
    }

    fn write_bytes(&self, va: Vaddr, buf: &[u8]) -> mm::Result<()> {
        self.check_range(va, buf.len())?;
        let mut mem = self.mem.lock();
        mem[va..va + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

pub struct MockVmProvider;

impl VmProvider for MockVmProvider {
    fn alloc(&self) -> Result<Arc<dyn VmSpace>> {
        Ok(MockVmSpace::empty())
    }

    fn fork(&self, src: &Arc<dyn VmSpace>) -> Result<Arc<dyn VmSpace>> {
        let mock = src
            .downcast_ref::<MockVmSpace>()
            .expect("foreign address space");
        Ok(MockVmSpace::fork_of(mock))
    }

    fn load_program(&self, space: &Arc<dyn VmSpace>, program: &Arc<dyn Vnode>) -> Result<Vaddr> {
        let node = program
            .downcast_ref::<RamNode>()
            .ok_or(Error::with_message(Errno::ENOEXEC, "not a ram node"))?;
        let program_fn = node
            .program
            .lock()
            .clone()
            .ok_or(Error::with_message(Errno::ENOEXEC, "not an executable"))?;

        let mock = space
            .downcast_ref::<MockVmSpace>()
            .expect("foreign address space");
        mock.set_program(program_fn);
        Ok(ENTRY_VADDR)
    }

    fn map_stack(&self, _space: &Arc<dyn VmSpace>) -> Result<Vaddr> {
        Ok(STACK_TOP)
    }
}

// ------------------------------------------------------------------
// Mock filesystem
// ------------------------------------------------------------------

pub struct RamNode {
    path: String,
    type_: VnodeType,
    data: Mutex<Vec<u8>>,
    program: Mutex<Option<Arc<ProgramFn>>>,
}

impl Vnode for RamNode {
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let data = self.data.lock();
        if offset >= data.len() {
            return Ok(0);
        }
        let len = buf.len().min(data.len() - offset);
        buf[..len].copy_from_slice(&data[offset..offset + len]);
        Ok(len)
    }

    fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize> {
        let mut data = self.data.lock();
        if data.len() < offset + buf.len() {
            data.resize(offset + buf.len(), 0);
        }
        data[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            size: self.data.lock().len(),
            type_: self.type_,
        }
    }
}

/// A flat-namespace in-memory filesystem.
pub struct RamFs {
    nodes: StdMutex<HashMap<String, Arc<RamNode>>>,
}

impl RamFs {
    fn new() -> Self {
        let fs = Self {
            nodes: StdMutex::new(HashMap::new()),
        };
        fs.add_dir("/");
        fs.add_dir("/tmp");
        fs
    }

    fn add_node(&self, path: &str, type_: VnodeType) -> Arc<RamNode> {
        let node = Arc::new(RamNode {
            path: path.to_string(),
            type_,
            data: Mutex::new(Vec::new()),
            program: Mutex::new(None),
        });
        self.nodes
            .lock()
            .unwrap()
            .insert(path.to_string(), node.clone());
        node
    }

    pub fn add_dir(&self, path: &str) {
        self.add_node(path, VnodeType::Dir);
    }

    pub fn add_file(&self, path: &str, content: &[u8]) {
        let node = self.add_node(path, VnodeType::File);
        *node.data.lock() = content.to_vec();
    }

    /// Registers an executable: a file whose "image" is a scripted
    /// program.
    pub fn add_program(&self, path: &str, program: Arc<ProgramFn>) {
        let node = self.add_node(path, VnodeType::File);
        *node.program.lock() = Some(program);
    }

    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let node = self.nodes.lock().unwrap().get(path)?.clone();
        let data = node.data.lock().clone();
        Some(data)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.lock().unwrap().contains_key(path)
    }

    fn get(&self, path: &str) -> Option<Arc<RamNode>> {
        self.nodes.lock().unwrap().get(path).cloned()
    }

    fn absolutize(&self, base: &Arc<dyn Vnode>, path: &str) -> Result<String> {
        if path.starts_with('/') {
            return Ok(path.to_string());
        }
        let base = base
            .downcast_ref::<RamNode>()
            .ok_or(Error::with_message(Errno::EINVAL, "foreign base directory"))?;
        if base.path == "/" {
            Ok(alloc::format!("/{}", path))
        } else {
            Ok(alloc::format!("{}/{}", base.path, path))
        }
    }
}

impl Vfs for RamFs {
    fn root_dir(&self) -> Arc<dyn Vnode> {
        self.get("/").unwrap()
    }

    fn open_at(
        &self,
        base: &Arc<dyn Vnode>,
        path: &str,
        creation: CreationFlags,
    ) -> Result<Arc<dyn Vnode>> {
        let abs = self.absolutize(base, path)?;
        match self.get(&abs) {
            Some(node) => {
                if creation.contains(CreationFlags::O_CREAT | CreationFlags::O_EXCL) {
                    return_errno_with_message!(Errno::EEXIST, "the file already exists");
                }
                if creation.contains(CreationFlags::O_TRUNC) {
                    node.data.lock().clear();
                }
                Ok(node)
            }
            None => {
                if !creation.contains(CreationFlags::O_CREAT) {
                    return_errno_with_message!(Errno::ENOENT, "no such file");
                }
                Ok(self.add_node(&abs, VnodeType::File))
            }
        }
    }

    fn lookup_dir_at(&self, base: &Arc<dyn Vnode>, path: &str) -> Result<Arc<dyn Vnode>> {
        let abs = self.absolutize(base, path)?;
        let node = self
            .get(&abs)
            .ok_or(Error::with_message(Errno::ENOENT, "no such directory"))?;
        Ok(node)
    }

    fn abs_path_of(&self, dir: &Arc<dyn Vnode>) -> Result<String> {
        let node = dir
            .downcast_ref::<RamNode>()
            .ok_or(Error::with_message(Errno::EINVAL, "foreign directory"))?;
        Ok(node.path.clone())
    }
}

// ------------------------------------------------------------------
// Mock console
// ------------------------------------------------------------------

pub struct MockConsole {
    output: StdMutex<Vec<u8>>,
    input: StdMutex<Vec<u8>>,
}

impl MockConsole {
    fn new() -> Self {
        Self {
            output: StdMutex::new(Vec::new()),
            input: StdMutex::new(Vec::new()),
        }
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().unwrap().clone()
    }

    pub fn clear_output(&self) {
        self.output.lock().unwrap().clear();
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.input.lock().unwrap().extend_from_slice(bytes);
    }
}

impl ConsoleDriver for MockConsole {
    fn putch(&self, ch: u8) {
        self.output.lock().unwrap().push(ch);
    }

    fn getch(&self) -> i32 {
        let mut input = self.input.lock().unwrap();
        if input.is_empty() {
            return -1;
        }
        input.remove(0) as i32
    }
}

// ------------------------------------------------------------------
// Mock scheduler and user-mode executor
// ------------------------------------------------------------------

std::thread_local! {
    static CURRENT_TID: core::cell::Cell<Option<Tid>> = const { core::cell::Cell::new(None) };
}

pub struct ThreadScheduler {
    threads: StdMutex<HashMap<Tid, thread::Thread>>,
}

impl ThreadScheduler {
    fn new() -> Self {
        Self {
            threads: StdMutex::new(HashMap::new()),
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn current_tid(&self) -> Option<Tid> {
        CURRENT_TID.with(|c| c.get())
    }

    fn spawn(&self, tid: Tid, entry: Box<dyn FnOnce() + Send + 'static>) {
        // Hold the entry back until the thread handle is registered, so an
        // early unpark cannot be lost.
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            CURRENT_TID.with(|c| c.set(Some(tid)));
            let _ = rx.recv();
            entry();
        });
        self.threads
            .lock()
            .unwrap()
            .insert(tid, handle.thread().clone());
        let _ = tx.send(());
    }

    fn park(&self) {
        thread::park();
    }

    fn unpark(&self, tid: Tid) {
        if let Some(t) = self.threads.lock().unwrap().get(&tid) {
            t.unpark();
        }
    }

    fn yield_now(&self) {
        thread::yield_now();
    }
}

struct ScriptedUserMode;

impl UserMode for ScriptedUserMode {
    fn execute(&self, ctx: &mut UserContext) -> ReturnReason {
        let current = crate::process::current();
        let vm_space = current
            .vm_space()
            .expect("a scripted program needs an address space");
        let mock = vm_space
            .downcast_ref::<MockVmSpace>()
            .expect("foreign address space");

        let step = mock.step.fetch_add(1, Ordering::Relaxed);
        let program = mock
            .program
            .lock()
            .clone()
            .expect("no program loaded into the address space");

        let user_step = {
            let step_ctx = StepCtx {
                step,
                ctx,
                mem: mock,
            };
            program(&step_ctx)
        };

        match user_step {
            UserStep::Syscall { num, args } => {
                ctx.set_syscall_num(num);
                ctx.set_syscall_args(args);
                ReturnReason::UserSyscall
            }
            UserStep::Fault => ReturnReason::UserException,
        }
    }
}

// ------------------------------------------------------------------
// Boot and process helpers
// ------------------------------------------------------------------

#[derive(Clone, Copy)]
pub struct TestEnv {
    pub fs: &'static RamFs,
    pub console: &'static MockConsole,
}

static TEST_ENV: Once<TestEnv> = Once::new();
static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(0);

/// Boots the kernel against the mock collaborators (first call only) and
/// returns handles to them.
pub fn boot() -> TestEnv {
    *TEST_ENV.call_once(|| {
        let fs: &'static RamFs = Box::leak(Box::new(RamFs::new()));
        let console: &'static MockConsole = Box::leak(Box::new(MockConsole::new()));
        let scheduler: &'static ThreadScheduler = Box::leak(Box::new(ThreadScheduler::new()));
        let user_mode: &'static ScriptedUserMode = Box::leak(Box::new(ScriptedUserMode));
        let vm: &'static MockVmProvider = Box::leak(Box::new(MockVmProvider));

        crate::init(crate::Collaborators {
            scheduler,
            user_mode,
            vm,
            vfs: fs,
            console,
        });

        TestEnv { fs, console }
    })
}

/// Registers `program` under a unique path, spawns it as an init-style
/// process, and returns the process and the path used.
pub fn spawn_program(
    program: impl Fn(&StepCtx) -> UserStep + Send + Sync + 'static,
) -> Arc<Process> {
    let env = boot();
    let path = alloc::format!(
        "/bin/test-{}",
        NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)
    );
    env.fs.add_program(&path, Arc::new(program));

    let argv = vec![CString::new(path.as_str()).unwrap()];
    Process::spawn_user_process(&path, argv).expect("failed to spawn the test program")
}

/// Polls until `process` has exited, reaps it from the table, and returns
/// its encoded wait status.
pub fn wait_process_exit(process: &Arc<Process>) -> u32 {
    for _ in 0..2000 {
        if let Some(exit_code) = process.exit_code() {
            process_table::remove(process.pid());
            return exit_code;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("the test process did not exit");
}

/// Spawns `program` and waits for it, returning its encoded wait status.
pub fn run_program_to_completion(
    program: impl Fn(&StepCtx) -> UserStep + Send + Sync + 'static,
) -> u32 {
    let process = spawn_program(program);
    wait_process_exit(&process)
}
