// SPDX-License-Identifier: MPL-2.0

//! Bounded copies between user memory and kernel buffers.
//!
//! Every transfer goes through the current process's address space; a null
//! or unmapped user pointer surfaces as `EFAULT` before any state changes.

use ferrite_frame::{mm::VmSpace, Vaddr};

use crate::prelude::*;

/// A reference to the current process's user address space.
pub struct CurrentUserSpace(Arc<dyn VmSpace>);

impl CurrentUserSpace {
    pub fn get() -> Result<Self> {
        let vm_space = current!()
            .vm_space()
            .ok_or(Error::with_message(
                Errno::EFAULT,
                "the process has no user address space",
            ))?;
        Ok(Self(vm_space))
    }

    pub fn read_bytes(&self, addr: Vaddr, buf: &mut [u8]) -> Result<()> {
        if addr == 0 {
            return_errno_with_message!(Errno::EFAULT, "the user pointer is null");
        }
        Ok(self.0.read_bytes(addr, buf)?)
    }

    pub fn write_bytes(&self, addr: Vaddr, buf: &[u8]) -> Result<()> {
        if addr == 0 {
            return_errno_with_message!(Errno::EFAULT, "the user pointer is null");
        }
        Ok(self.0.write_bytes(addr, buf)?)
    }
}

/// Reads a user pointer (one argv slot) from `addr`.
pub fn read_uptr_from_user(addr: Vaddr) -> Result<Vaddr> {
    let mut bytes = [0u8; core::mem::size_of::<u64>()];
    CurrentUserSpace::get()?.read_bytes(addr, &mut bytes)?;
    Ok(u64::from_ne_bytes(bytes) as Vaddr)
}

/// Writes a 32-bit scalar result through a user pointer.
pub fn write_i32_to_user(addr: Vaddr, val: i32) -> Result<()> {
    CurrentUserSpace::get()?.write_bytes(addr, &val.to_ne_bytes())
}

/// Writes `bytes` into user memory at `addr`.
pub fn write_bytes_to_user(addr: Vaddr, bytes: &[u8]) -> Result<()> {
    CurrentUserSpace::get()?.write_bytes(addr, bytes)
}

/// Reads `buf.len()` bytes of user memory at `addr`.
pub fn read_bytes_from_user(addr: Vaddr, buf: &mut [u8]) -> Result<()> {
    CurrentUserSpace::get()?.read_bytes(addr, buf)
}

/// Reads a nul-terminated string of at most `max_len` bytes (terminator
/// included) from user memory.
pub fn read_cstring_from_user(addr: Vaddr, max_len: usize) -> Result<CString> {
    const CHUNK_LEN: usize = 128;

    let user_space = CurrentUserSpace::get()?;
    if addr == 0 {
        return_errno_with_message!(Errno::EFAULT, "the user pointer is null");
    }

    let mut bytes: Vec<u8> = Vec::new();
    while bytes.len() < max_len {
        let chunk_len = CHUNK_LEN.min(max_len - bytes.len());
        let mut chunk = [0u8; CHUNK_LEN];
        user_space.read_bytes(addr + bytes.len(), &mut chunk[..chunk_len])?;

        if let Some(nul) = chunk[..chunk_len].iter().position(|b| *b == 0) {
            bytes.extend_from_slice(&chunk[..nul]);
            // The unwrap cannot fail: the collected bytes contain no nul.
            return Ok(CString::new(bytes).unwrap());
        }
        bytes.extend_from_slice(&chunk[..chunk_len]);
    }

    return_errno_with_message!(Errno::ENAMETOOLONG, "the user string is too long")
}
