// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{fs::file_table::FileDesc, prelude::*};

pub fn sys_dup(old_fd: FileDesc) -> Result<SyscallReturn> {
    debug!("old_fd = {}", old_fd);

    let current = current!();
    let mut file_table = current.file_table().lock();
    let new_fd = file_table.dup(old_fd, 0)?;

    Ok(SyscallReturn::Return(new_fd as _))
}

pub fn sys_dup2(old_fd: FileDesc, new_fd: FileDesc) -> Result<SyscallReturn> {
    debug!("old_fd = {}, new_fd = {}", old_fd, new_fd);

    let current = current!();
    let mut file_table = current.file_table().lock();
    let file = file_table.get_file(old_fd)?.clone();

    // Duplicating a descriptor onto itself is a no-op.
    if old_fd == new_fd {
        return Ok(SyscallReturn::Return(new_fd as _));
    }

    // Whatever sat at the target slot before is released; the shared file
    // object gains one reference for the new slot.
    let old_file = file_table.insert_at(new_fd, file)?;
    drop(file_table);
    drop(old_file);

    Ok(SyscallReturn::Return(new_fd as _))
}
