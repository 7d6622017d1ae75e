// SPDX-License-Identifier: MPL-2.0

//! Opened file handle.

use crate::{
    fs::utils::{AccessMode, SeekFrom},
    prelude::*,
    vfs::Metadata,
};

/// The basic operations defined on an open file.
///
/// A file-table slot holds an `Arc<dyn FileLike>`; the `Arc` reference count
/// is the open-file reference count, so duplicating a descriptor and
/// inheriting a table across fork are both `Arc` clones, and the last drop
/// releases the underlying object.
pub trait FileLike: Send + Sync + Any + core::fmt::Debug {
    fn read(&self, _buf: &mut [u8]) -> Result<usize> {
        return_errno_with_message!(Errno::EBADF, "the file is not valid for reading");
    }

    fn write(&self, _buf: &[u8]) -> Result<usize> {
        return_errno_with_message!(Errno::EBADF, "the file is not valid for writing");
    }

    fn seek(&self, _pos: SeekFrom) -> Result<usize> {
        return_errno_with_message!(Errno::ESPIPE, "seek is not supported");
    }

    fn metadata(&self) -> Result<Metadata> {
        return_errno_with_message!(Errno::EINVAL, "metadata is not supported");
    }

    fn access_mode(&self) -> AccessMode {
        AccessMode::O_RDWR
    }
}

impl dyn FileLike {
    pub fn downcast_ref<T: FileLike>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
