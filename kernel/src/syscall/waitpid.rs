// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{
    prelude::*,
    process::{reap_child, wait_child_exit, WaitOptions},
    util::write_i32_to_user,
};

pub fn sys_waitpid(pid: i32, status_addr: Vaddr, options: u32) -> Result<SyscallReturn> {
    let options = WaitOptions::from_bits(options).ok_or(Error::with_message(
        Errno::EINVAL,
        "unknown wait option",
    ))?;
    debug!("pid = {}, status_addr = {:#x}, options = {:?}", pid, status_addr, options);

    let child = wait_child_exit(pid, options)?;
    let exit_code = child.exit_code().unwrap();

    // A null status pointer skips the report; a bad one leaves the child
    // unreaped so a retry can still collect it.
    if status_addr != 0 {
        write_i32_to_user(status_addr, exit_code as i32)?;
    }

    let return_pid = child.pid();
    reap_child(&child);

    Ok(SyscallReturn::Return(return_pid as _))
}
