// SPDX-License-Identifier: MPL-2.0

//! The user-mode execution seam.

use spin::Once;

use crate::cpu::UserContext;

/// Why [`UserMode::execute`] returned to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnReason {
    /// The thread issued a system call; the syscall number and arguments
    /// are in the context's registers.
    UserSyscall,
    /// The thread triggered an exception it cannot recover from.
    UserException,
}

/// Runs a thread in user mode.
///
/// `execute` enters user mode with the given CPU state and returns when the
/// thread traps back into the kernel, with the context updated to the
/// trap-time state. The trap glue behind this trait is platform code; the
/// kernel only consumes its return reason.
pub trait UserMode: Send + Sync {
    fn execute(&self, ctx: &mut UserContext) -> ReturnReason;
}

static USER_MODE: Once<&'static dyn UserMode> = Once::new();

/// Registers the user-mode executor. Must be called exactly once at boot.
pub fn set_user_mode(user_mode: &'static dyn UserMode) {
    USER_MODE.call_once(|| user_mode);
}

/// Returns the registered user-mode executor.
///
/// # Panics
///
/// Panics if no executor has been registered.
pub fn user_mode() -> &'static dyn UserMode {
    *USER_MODE.get().expect("no user-mode executor is registered")
}
