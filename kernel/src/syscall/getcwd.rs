// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{prelude::*, util::write_bytes_to_user};

pub fn sys_getcwd(buf_addr: Vaddr, buf_len: usize) -> Result<SyscallReturn> {
    debug!("buf_addr = {:#x}, buf_len = {}", buf_addr, buf_len);

    if buf_addr == 0 {
        return_errno_with_message!(Errno::EFAULT, "the user buffer is null");
    }
    if buf_len == 0 {
        return_errno_with_message!(Errno::EINVAL, "the user buffer is empty");
    }

    let current = current!();
    let cwd = current.with_fs(|fs| fs.abs_cwd_path())?;

    let bytes = cwd.as_bytes();
    // The terminator travels with the path; a short buffer gets a
    // truncated prefix.
    let write_len = buf_len.min(bytes.len() + 1);
    let mut out = Vec::with_capacity(write_len);
    out.extend_from_slice(&bytes[..write_len - 1]);
    out.push(0);
    write_bytes_to_user(buf_addr, &out)?;

    Ok(SyscallReturn::Return(write_len as _))
}
