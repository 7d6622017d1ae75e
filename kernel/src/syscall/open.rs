// SPDX-License-Identifier: MPL-2.0

use super::{constants::PATH_MAX, SyscallReturn};
use crate::{
    fs::file_handle::FileLike,
    prelude::*,
    util::read_cstring_from_user,
};

pub fn sys_open(path_addr: Vaddr, flags: u32, mode: u16) -> Result<SyscallReturn> {
    let path = read_cstring_from_user(path_addr, PATH_MAX)?;
    debug!("path = {:?}, flags = {}, mode = {}", path, flags, mode);

    let current = current!();
    let file_handle: Arc<dyn FileLike> = {
        let path = path.to_str()?;
        let handle = current.with_fs(|fs| fs.open(path, flags))?;
        Arc::new(handle)
    };

    let mut file_table = current.file_table().lock();
    let fd = file_table.insert(file_handle)?;
    Ok(SyscallReturn::Return(fd as _))
}
