// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::prelude::*;

pub fn sys_getppid() -> Result<SyscallReturn> {
    let ppid = current!().parent().map_or(0, |parent| parent.pid());
    debug!("[sys_getppid]: ppid = {}", ppid);
    Ok(SyscallReturn::Return(ppid as _))
}
