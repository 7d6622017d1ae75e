// SPDX-License-Identifier: MPL-2.0

use super::{constants::PATH_MAX, SyscallReturn};
use crate::{prelude::*, util::read_cstring_from_user};

pub fn sys_chdir(path_addr: Vaddr) -> Result<SyscallReturn> {
    let path = read_cstring_from_user(path_addr, PATH_MAX)?;
    debug!("path = {:?}", path);

    let current = current!();
    current.with_fs_mut(|fs| {
        let dir = fs.lookup_dir(path.to_str()?)?;
        fs.set_cwd(dir);
        Ok(())
    })?;
    Ok(SyscallReturn::Return(0))
}
