// SPDX-License-Identifier: MPL-2.0

//! Flag and seek types shared across the file layer.

use crate::prelude::*;

/// How a file is opened for access.
#[repr(u32)]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Read only.
    O_RDONLY = 0,
    /// Write only.
    O_WRONLY = 1,
    /// Read and write.
    O_RDWR = 2,
}

/// The bits of the open flags that select the access mode.
pub const ACCESS_MODE_MASK: u32 = 0x3;

impl AccessMode {
    pub fn from_u32(raw: u32) -> Result<Self> {
        match raw & ACCESS_MODE_MASK {
            0 => Ok(AccessMode::O_RDONLY),
            1 => Ok(AccessMode::O_WRONLY),
            2 => Ok(AccessMode::O_RDWR),
            _ => return_errno_with_message!(Errno::EINVAL, "invalid access mode"),
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, AccessMode::O_RDONLY | AccessMode::O_RDWR)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, AccessMode::O_WRONLY | AccessMode::O_RDWR)
    }
}

bitflags! {
    /// Flags that only matter while the open call resolves the path.
    pub struct CreationFlags: u32 {
        /// Create the file if it does not exist.
        const O_CREAT = 0x40;
        /// With `O_CREAT`, fail if the file already exists.
        const O_EXCL = 0x80;
        /// Truncate the file to length zero.
        const O_TRUNC = 0x200;
    }
}

bitflags! {
    /// Flags that stay attached to the open file.
    pub struct StatusFlags: u32 {
        /// Every write lands at the end of the file.
        const O_APPEND = 0x400;
    }
}

/// Where a seek is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Start(usize),
    End(isize),
    Current(isize),
}
