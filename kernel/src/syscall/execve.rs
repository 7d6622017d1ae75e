// SPDX-License-Identifier: MPL-2.0

use ferrite_frame::cpu::UserContext;

use super::{
    constants::{ARG_MAX, PATH_MAX},
    SyscallReturn,
};
use crate::{
    prelude::*,
    process::{
        do_exec,
        init_stack::{aligned_arg_len, MAX_ARGV_NUMBER},
    },
    util::{read_cstring_from_user, read_uptr_from_user},
};

const UPTR_SIZE: usize = core::mem::size_of::<u64>();

pub fn sys_execve(
    path_addr: Vaddr,
    argv_addr: Vaddr,
    ctx: &mut UserContext,
) -> Result<SyscallReturn> {
    if path_addr == 0 {
        return_errno_with_message!(Errno::EFAULT, "the program path pointer is null");
    }
    if argv_addr == 0 {
        return_errno_with_message!(Errno::EFAULT, "the argument vector pointer is null");
    }

    let path = read_cstring_from_user(path_addr, PATH_MAX)?;
    let argv = read_argv_from_user(argv_addr)?;
    debug!("path = {:?}, argc = {}", path, argv.len());

    do_exec(path.to_str()?, argv, ctx)?;

    // The context now enters the new image; the return registers carry its
    // entry arguments.
    Ok(SyscallReturn::NoReturn)
}

/// Copies the user argument vector into kernel memory, bounding both the
/// entry count and the projected footprint on the new user stack.
fn read_argv_from_user(argv_addr: Vaddr) -> Result<Vec<CString>> {
    let mut argv = Vec::new();
    let mut string_bytes = 0usize;

    loop {
        let arg_ptr = read_uptr_from_user(argv_addr + argv.len() * UPTR_SIZE)?;
        if arg_ptr == 0 {
            break;
        }
        if argv.len() >= MAX_ARGV_NUMBER {
            return_errno_with_message!(Errno::E2BIG, "too many execve arguments");
        }

        let arg = read_cstring_from_user(arg_ptr, ARG_MAX)?;
        string_bytes += aligned_arg_len(&arg);
        // Strings plus the null-terminated pointer array must fit on the
        // new stack.
        if string_bytes + (argv.len() + 2) * UPTR_SIZE > ARG_MAX {
            return_errno_with_message!(Errno::E2BIG, "the execve argument vector is too large");
        }
        argv.push(arg);
    }

    Ok(argv)
}
