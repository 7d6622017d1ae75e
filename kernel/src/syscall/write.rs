// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{fs::file_table::FileDesc, prelude::*, util::read_bytes_from_user};

pub fn sys_write(fd: FileDesc, user_buf_addr: Vaddr, buf_len: usize) -> Result<SyscallReturn> {
    debug!(
        "fd = {}, user_buf_ptr = {:#x}, buf_len = {:#x}",
        fd, user_buf_addr, buf_len
    );

    let file = {
        let current = current!();
        let file_table = current.file_table().lock();
        file_table.get_file(fd)?.clone()
    };

    let write_len = if buf_len != 0 {
        let mut write_buf = vec![0u8; buf_len];
        read_bytes_from_user(user_buf_addr, &mut write_buf)?;
        file.write(&write_buf)?
    } else {
        file.write(&[])?
    };

    Ok(SyscallReturn::Return(write_len as _))
}
