// SPDX-License-Identifier: MPL-2.0

//! The POSIX process and file-descriptor subsystem of the Ferrite kernel.
//!
//! The subsystem owns the process table, process objects, per-process file
//! tables and the shared open-file objects behind them, and the syscall
//! surface over both. Path lookup, address-space management, scheduling and
//! the user-mode trap glue are collaborator components plugged in through
//! [`init`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod device;
pub mod error;
pub mod fs;
pub mod prelude;
pub mod process;
pub mod syscall;
pub mod thread;
pub mod util;
pub mod vfs;
pub mod vm;

#[cfg(test)]
mod test_env;

use ferrite_frame::{task::Scheduler, user::UserMode};

/// The collaborator components the subsystem is wired to at boot.
pub struct Collaborators {
    pub scheduler: &'static dyn Scheduler,
    pub user_mode: &'static dyn UserMode,
    pub vm: &'static dyn vm::VmProvider,
    pub vfs: &'static dyn vfs::Vfs,
    pub console: &'static dyn device::console::ConsoleDriver,
}

/// Bootstraps the subsystem. Must be called exactly once, before the first
/// process is created.
pub fn init(collaborators: Collaborators) {
    ferrite_frame::task::set_scheduler(collaborators.scheduler);
    ferrite_frame::user::set_user_mode(collaborators.user_mode);
    vm::set_vm_provider(collaborators.vm);
    vfs::set_vfs(collaborators.vfs);
    device::console::set_console_driver(collaborators.console);
}
