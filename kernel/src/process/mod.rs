// SPDX-License-Identifier: MPL-2.0

//! Process management.

mod builder;
mod exec;
mod exit;
mod fork;
pub mod init_stack;
mod process;
pub mod process_table;
mod process_vm;
mod status;
mod wait;

pub use builder::ProcessBuilder;
pub use exec::do_exec;
pub use exit::do_exit;
pub use fork::fork_child;
pub use process::{current, ExitCode, Pid, Process};
pub use process_table::PROC_MAX;
pub use process_vm::ProcessVm;
pub use status::{ProcessStatus, TermStatus};
pub use wait::{reap_child, wait_child_exit, WaitOptions};
