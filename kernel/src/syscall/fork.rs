// SPDX-License-Identifier: MPL-2.0

use ferrite_frame::cpu::UserContext;

use super::SyscallReturn;
use crate::{prelude::*, process::fork_child};

pub fn sys_fork(parent_ctx: &UserContext) -> Result<SyscallReturn> {
    let child_pid = fork_child(parent_ctx)?;
    debug!("forked child pid = {}", child_pid);
    Ok(SyscallReturn::Return(child_pid as _))
}
