// SPDX-License-Identifier: MPL-2.0

//! Reads the CPU context content, then dispatches the syscall to the
//! corresponding handler. Each submodule holds the real logic of one
//! syscall.

use ferrite_frame::cpu::UserContext;

use crate::prelude::*;

mod chdir;
mod close;
pub mod constants;
mod dup;
mod execve;
mod exit;
mod fork;
mod getcwd;
mod getpid;
mod getppid;
mod lseek;
mod open;
mod read;
mod waitpid;
mod write;


use chdir::sys_chdir;
use close::sys_close;
use dup::{sys_dup, sys_dup2};
use execve::sys_execve;
use exit::sys_exit;
use fork::sys_fork;
use getcwd::sys_getcwd;
use getpid::sys_getpid;
use getppid::sys_getppid;
use lseek::sys_lseek;
use open::sys_open;
use read::sys_read;
use waitpid::sys_waitpid;
use write::sys_write;

/// This macro is used to define the syscall handler invocations.
/// The first param is the number of parameters, the second is the function
/// name of the syscall handler, the third the argument array, and the
/// fourth, optional, the CPU context when the handler needs it.
macro_rules! syscall_handler {
    (0, $fn_name: ident, $args: ident) => { $fn_name() };
    (0, $fn_name: ident, $args: ident, $context: expr) => { $fn_name($context) };
    (1, $fn_name: ident, $args: ident) => { $fn_name($args[0] as _) };
    (2, $fn_name: ident, $args: ident) => { $fn_name($args[0] as _, $args[1] as _) };
    (2, $fn_name: ident, $args: ident, $context: expr) => {
        $fn_name($args[0] as _, $args[1] as _, $context)
    };
    (3, $fn_name: ident, $args: ident) => {
        $fn_name($args[0] as _, $args[1] as _, $args[2] as _)
    };
}

macro_rules! dispatch_fn_inner {
    ( $args: ident, $context: ident, $handler: ident ( args[ .. $cnt: tt ] ) ) => {
        syscall_handler!($cnt, $handler, $args)
    };
    ( $args: ident, $context: ident, $handler: ident ( args[ .. $cnt: tt ] , &context ) ) => {
        syscall_handler!($cnt, $handler, $args, &$context)
    };
    ( $args: ident, $context: ident, $handler: ident ( args[ .. $cnt: tt ] , &mut context ) ) => {
        // `$context` is already a `&mut UserContext`, no need to take
        // `&mut` again.
        syscall_handler!($cnt, $handler, $args, $context)
    };
}

macro_rules! impl_syscall_nums_and_dispatch_fn {
    ( $( $name: ident = $num: literal => $handler: ident $args: tt );* $(;)? ) => {
        // First, define the syscall numbers.
        $(
            pub const $name: u64 = $num;
        )*

        // Then, define the dispatcher function.
        pub fn syscall_dispatch(
            syscall_number: u64,
            args: [u64; 6],
            context: &mut UserContext,
        ) -> Result<SyscallReturn> {
            match syscall_number {
                $(
                    $num => {
                        $crate::log_syscall_entry!($name);
                        dispatch_fn_inner!(args, context, $handler $args)
                    }
                )*
                _ => {
                    warn!("unimplemented syscall number: {}", syscall_number);
                    return_errno_with_message!(Errno::ENOSYS, "the syscall is unimplemented");
                }
            }
        }
    }
}

impl_syscall_nums_and_dispatch_fn! {
    SYS_OPEN = 1 => sys_open(args[..3]);
    SYS_CLOSE = 2 => sys_close(args[..1]);
    SYS_READ = 3 => sys_read(args[..3]);
    SYS_WRITE = 4 => sys_write(args[..3]);
    SYS_LSEEK = 5 => sys_lseek(args[..3]);
    SYS_DUP = 6 => sys_dup(args[..1]);
    SYS_DUP2 = 7 => sys_dup2(args[..2]);
    SYS_CHDIR = 8 => sys_chdir(args[..1]);
    SYS_GETCWD = 9 => sys_getcwd(args[..2]);
    SYS_GETPID = 10 => sys_getpid(args[..0]);
    SYS_GETPPID = 11 => sys_getppid(args[..0]);
    SYS_FORK = 12 => sys_fork(args[..0], &context);
    SYS_EXECVE = 13 => sys_execve(args[..2], &mut context);
    SYS_WAITPID = 14 => sys_waitpid(args[..3]);
    SYS_EXIT = 15 => sys_exit(args[..1]);
}

/// Syscall return.
#[derive(Debug, Clone, Copy)]
pub enum SyscallReturn {
    /// The value to place in the return register.
    Return(isize),
    /// The return register is not to be touched; the handler has set up the
    /// context itself.
    NoReturn,
}

/// Handles the syscall the current thread trapped with, leaving the result
/// (or a negated error number) in the context's return register.
pub fn handle_syscall(context: &mut UserContext) {
    let syscall_number = context.syscall_num();
    let args = context.syscall_args();

    let syscall_return = syscall_dispatch(syscall_number, args, context);

    match syscall_return {
        Ok(SyscallReturn::Return(return_value)) => {
            context.set_syscall_ret(return_value as usize);
        }
        Ok(SyscallReturn::NoReturn) => (),
        Err(err) => {
            debug!("syscall return error: {:?}", err);
            let errno = err.error() as i32;
            context.set_syscall_ret((-errno) as usize);
        }
    }
}

#[macro_export]
macro_rules! log_syscall_entry {
    ($syscall_name: tt) => {
        if log::log_enabled!(log::Level::Info) {
            let syscall_name_str = stringify!($syscall_name);
            let pid = $crate::current!().pid();
            log::info!("[pid={}][id={}][{}]", pid, $syscall_name, syscall_name_str);
        }
    };
}
