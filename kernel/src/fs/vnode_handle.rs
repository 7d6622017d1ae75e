// SPDX-License-Identifier: MPL-2.0

//! Opened vnode-backed file handle.

use crate::{
    fs::{
        file_handle::FileLike,
        utils::{AccessMode, SeekFrom, StatusFlags},
    },
    prelude::*,
    vfs::{Metadata, Vnode},
};

/// An open file backed by a vnode.
///
/// The handle pairs the vnode with the per-open state: the access mode, the
/// status flags, and the byte offset. The offset lock serializes all reads
/// of and updates to the offset together with the vnode I/O performed at
/// that offset, so concurrent operations on a shared handle each observe a
/// contiguous advance.
pub struct VnodeHandle {
    vnode: Arc<dyn Vnode>,
    offset: Mutex<usize>,
    access_mode: AccessMode,
    status_flags: StatusFlags,
}

impl core::fmt::Debug for VnodeHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VnodeHandle")
            .field("offset", &*self.offset.lock())
            .field("access_mode", &self.access_mode)
            .field("status_flags", &self.status_flags)
            .finish()
    }
}

impl VnodeHandle {
    /// Wraps a freshly opened vnode.
    ///
    /// An append-mode handle starts at the current end of the file;
    /// everything else starts at offset zero.
    pub fn new(
        vnode: Arc<dyn Vnode>,
        access_mode: AccessMode,
        status_flags: StatusFlags,
    ) -> Result<Self> {
        let metadata = vnode.metadata();
        if metadata.type_ == crate::vfs::VnodeType::Dir && access_mode.is_writable() {
            return_errno_with_message!(Errno::EISDIR, "a directory cannot be opened writable");
        }

        let initial_offset = if status_flags.contains(StatusFlags::O_APPEND) {
            metadata.size
        } else {
            0
        };

        Ok(Self {
            vnode,
            offset: Mutex::new(initial_offset),
            access_mode,
            status_flags,
        })
    }

    pub fn vnode(&self) -> &Arc<dyn Vnode> {
        &self.vnode
    }

    pub fn offset(&self) -> usize {
        *self.offset.lock()
    }

    pub fn status_flags(&self) -> StatusFlags {
        self.status_flags
    }

    fn is_seekable(&self) -> bool {
        self.vnode.metadata().type_.is_seekable()
    }
}

impl FileLike for VnodeHandle {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.access_mode.is_readable() {
            return_errno_with_message!(Errno::EBADF, "the file is not opened readable");
        }

        if !self.is_seekable() {
            return self.vnode.read_at(0, buf);
        }

        let mut offset = self.offset.lock();

        let len = self.vnode.read_at(*offset, buf)?;
        *offset += len;

        Ok(len)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        if !self.access_mode.is_writable() {
            return_errno_with_message!(Errno::EBADF, "the file is not opened writable");
        }

        if !self.is_seekable() {
            return self.vnode.write_at(0, buf);
        }

        let mut offset = self.offset.lock();

        if self.status_flags.contains(StatusFlags::O_APPEND) {
            *offset = self.vnode.metadata().size;
        }

        let len = self.vnode.write_at(*offset, buf)?;
        *offset += len;

        Ok(len)
    }

    fn seek(&self, pos: SeekFrom) -> Result<usize> {
        if !self.is_seekable() {
            return_errno_with_message!(Errno::ESPIPE, "seek is not supported");
        }

        let mut offset = self.offset.lock();

        let new_offset = match pos {
            SeekFrom::Start(off) => {
                if off > isize::MAX as usize {
                    return_errno_with_message!(Errno::EINVAL, "the file offset is too large");
                }
                off as isize
            }
            SeekFrom::End(diff) => (self.vnode.metadata().size as isize)
                .checked_add(diff)
                .ok_or(Error::with_message(Errno::EINVAL, "the file offset overflows"))?,
            SeekFrom::Current(diff) => (*offset as isize)
                .checked_add(diff)
                .ok_or(Error::with_message(Errno::EINVAL, "the file offset overflows"))?,
        };
        if new_offset < 0 {
            return_errno_with_message!(Errno::EINVAL, "the file offset cannot be negative");
        }

        *offset = new_offset as usize;
        Ok(new_offset as usize)
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.vnode.metadata())
    }

    fn access_mode(&self) -> AccessMode {
        self.access_mode
    }
}
