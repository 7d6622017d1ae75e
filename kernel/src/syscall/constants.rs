// SPDX-License-Identifier: MPL-2.0

//! Constants shared by the syscall surface with user space.

/// The longest path a syscall accepts, terminator included.
pub const PATH_MAX: usize = 1024;

/// The most bytes an exec argument vector may occupy on the new user
/// stack, strings and pointer array together.
pub const ARG_MAX: usize = 65536;
