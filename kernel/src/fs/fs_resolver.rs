// SPDX-License-Identifier: MPL-2.0

//! The per-process filesystem context.

use crate::{
    fs::{
        utils::{AccessMode, CreationFlags, StatusFlags},
        vnode_handle::VnodeHandle,
    },
    prelude::*,
    vfs::{vfs, Vnode, VnodeType},
};

/// Holds a process's current working directory and resolves its paths.
///
/// The working directory is a shared vnode reference; cloning the resolver
/// (fork) shares the directory object, not the resolver state.
#[derive(Clone)]
pub struct FsResolver {
    cwd: Arc<dyn Vnode>,
}

impl FsResolver {
    /// A resolver rooted at the filesystem root.
    pub fn new() -> Self {
        Self {
            cwd: vfs().root_dir(),
        }
    }

    pub fn cwd(&self) -> &Arc<dyn Vnode> {
        &self.cwd
    }

    pub fn set_cwd(&mut self, dir: Arc<dyn Vnode>) {
        self.cwd = dir;
    }

    /// Opens `path` with the given open flags, producing the open-file
    /// object to install in a file table.
    pub fn open(&self, path: &str, flags: u32) -> Result<VnodeHandle> {
        if path.is_empty() {
            return_errno_with_message!(Errno::EINVAL, "the path is empty");
        }

        let access_mode = AccessMode::from_u32(flags)?;
        let creation_flags = CreationFlags::from_bits_truncate(flags);
        let status_flags = StatusFlags::from_bits_truncate(flags);
        if status_flags.contains(StatusFlags::O_APPEND) && !access_mode.is_writable() {
            return_errno_with_message!(Errno::EINVAL, "an append-mode open must be writable");
        }

        let vnode = vfs().open_at(&self.cwd, path, creation_flags)?;
        VnodeHandle::new(vnode, access_mode, status_flags)
    }

    /// Resolves `path` to an existing vnode without creating anything.
    pub fn lookup(&self, path: &str) -> Result<Arc<dyn Vnode>> {
        if path.is_empty() {
            return_errno_with_message!(Errno::ENOENT, "the path is empty");
        }
        vfs().open_at(&self.cwd, path, CreationFlags::empty())
    }

    /// Resolves `path` to an existing directory.
    pub fn lookup_dir(&self, path: &str) -> Result<Arc<dyn Vnode>> {
        if path.is_empty() {
            return_errno_with_message!(Errno::ENOENT, "the path is empty");
        }
        let dir = vfs().lookup_dir_at(&self.cwd, path)?;
        if dir.metadata().type_ != VnodeType::Dir {
            return_errno_with_message!(Errno::ENOTDIR, "the path is not a directory");
        }
        Ok(dir)
    }

    /// The absolute path of the working directory.
    pub fn abs_cwd_path(&self) -> Result<String> {
        vfs().abs_path_of(&self.cwd)
    }
}
