// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{
    prelude::*,
    process::{do_exit, TermStatus},
};

pub fn sys_exit(exit_code: i32) -> Result<SyscallReturn> {
    debug!("exit code = {}", exit_code);

    do_exit(TermStatus::Exited(exit_code));

    Ok(SyscallReturn::Return(0))
}
