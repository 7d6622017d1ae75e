// SPDX-License-Identifier: MPL-2.0

//! The per-process file-descriptor table.

use crate::{
    device::console::Console,
    fs::{file_handle::FileLike, utils::AccessMode},
    prelude::*,
};

pub type FileDesc = i32;

/// The number of descriptor slots each process gets.
pub const OPEN_MAX: usize = 128;

pub const STDIN_FD: FileDesc = 0;
pub const STDOUT_FD: FileDesc = 1;
pub const STDERR_FD: FileDesc = 2;

/// Maps file descriptors to open files.
///
/// A slot holds a shared reference; the same open file may sit in several
/// slots of several tables at once. Cloning the table (fork inheritance)
/// takes one more reference per installed slot.
pub struct FileTable {
    table: [Option<Arc<dyn FileLike>>; OPEN_MAX],
}

impl FileTable {
    pub const fn new() -> Self {
        Self {
            table: [const { None }; OPEN_MAX],
        }
    }

    /// A table with descriptors 0, 1 and 2 bound to the system console,
    /// readable on stdin and writable on stdout/stderr.
    pub fn new_with_stdio() -> Self {
        let stdin: Arc<dyn FileLike> = Console::new(AccessMode::O_RDONLY);
        let stdout: Arc<dyn FileLike> = Console::new(AccessMode::O_WRONLY);
        let stderr: Arc<dyn FileLike> = Console::new(AccessMode::O_WRONLY);

        let mut table = Self::new();
        table.table[STDIN_FD as usize] = Some(stdin);
        table.table[STDOUT_FD as usize] = Some(stdout);
        table.table[STDERR_FD as usize] = Some(stderr);
        table
    }

    /// Installs a file at the lowest free descriptor.
    pub fn insert(&mut self, file: Arc<dyn FileLike>) -> Result<FileDesc> {
        let fd = self
            .table
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(Error::with_message(
                Errno::EMFILE,
                "the file table is full",
            ))?;
        self.table[fd] = Some(file);
        Ok(fd as FileDesc)
    }

    /// Installs a file at `fd`, returning the file previously there.
    pub fn insert_at(
        &mut self,
        fd: FileDesc,
        file: Arc<dyn FileLike>,
    ) -> Result<Option<Arc<dyn FileLike>>> {
        check_fd_range(fd)?;
        Ok(self.table[fd as usize].replace(file))
    }

    /// Duplicates `fd` into the lowest free descriptor not below `min_fd`.
    pub fn dup(&mut self, fd: FileDesc, min_fd: FileDesc) -> Result<FileDesc> {
        let file = self.get_file(fd)?.clone();
        check_fd_range(min_fd)?;

        let new_fd = self.table[min_fd as usize..]
            .iter()
            .position(|slot| slot.is_none())
            .map(|idx| idx + min_fd as usize)
            .ok_or(Error::with_message(
                Errno::EMFILE,
                "the file table is full",
            ))?;
        self.table[new_fd] = Some(file);
        Ok(new_fd as FileDesc)
    }

    /// Detaches and returns the file at `fd`.
    pub fn close_file(&mut self, fd: FileDesc) -> Option<Arc<dyn FileLike>> {
        if check_fd_range(fd).is_err() {
            return None;
        }
        self.table[fd as usize].take()
    }

    /// Detaches every installed file, returning them all.
    pub fn close_all(&mut self) -> Vec<Arc<dyn FileLike>> {
        let mut closed_files = Vec::new();
        for slot in self.table.iter_mut() {
            if let Some(file) = slot.take() {
                closed_files.push(file);
            }
        }
        closed_files
    }

    pub fn get_file(&self, fd: FileDesc) -> Result<&Arc<dyn FileLike>> {
        check_fd_range(fd)?;
        self.table[fd as usize]
            .as_ref()
            .ok_or(Error::with_message(
                Errno::EBADF,
                "the file descriptor is not open",
            ))
    }

    pub fn fds_and_files(&self) -> impl Iterator<Item = (FileDesc, &'_ Arc<dyn FileLike>)> {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(fd, slot)| slot.as_ref().map(|file| (fd as FileDesc, file)))
    }
}

fn check_fd_range(fd: FileDesc) -> Result<()> {
    if fd < 0 || fd as usize >= OPEN_MAX {
        return_errno_with_message!(Errno::EBADF, "the file descriptor is out of range");
    }
    Ok(())
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FileTable {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}
