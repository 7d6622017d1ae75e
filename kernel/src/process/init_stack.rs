// SPDX-License-Identifier: MPL-2.0

//! The initial user stack of a process.
//!
//! Exec pushes the argument vector onto the fresh stack before the first
//! user instruction runs; the new process receives `argc` and the address
//! of the pointer array in its entry registers, with a null environment.
//!
//! Layout, growing down from the stack top:
//!
//! ```text
//!  (high address)
//!  +---------------------+ <------+ stack top
//!  | argv[argc-1] bytes  |
//!  | ...                 |          each string padded so the next
//!  | argv[0] bytes       |          push stays 4-byte aligned
//!  +---------------------+
//!  | NULL                |
//!  +---------------------+
//!  | char* argv[argc-1]  |
//!  +---------------------+
//!  | ...                 |
//!  +---------------------+
//!  | char* argv[0]       | <------+ initial stack pointer, 8-byte aligned
//!  +---------------------+
//!  (low address)
//! ```

use ferrite_frame::{mm::VmSpace, Vaddr};

use crate::{prelude::*, syscall::constants::ARG_MAX};

/// The most argv entries an exec accepts: one pointer slot each within
/// `ARG_MAX`.
pub const MAX_ARGV_NUMBER: usize = ARG_MAX / core::mem::size_of::<u64>();

const UPTR_SIZE: usize = core::mem::size_of::<u64>();

/// Where a freshly written stack hands control to user mode.
#[derive(Debug, Clone, Copy)]
pub struct InitStackLayout {
    pub argc: u64,
    pub argv_ptr: Vaddr,
    pub stack_pointer: Vaddr,
}

/// The user-stack bytes one argument contributes: the string, its nul, and
/// padding up to the next 4-byte boundary.
pub(crate) fn aligned_arg_len(arg: &CStr) -> usize {
    align_up(arg.to_bytes_with_nul().len(), 4)
}

/// The projected stack footprint of an argument vector: string bytes plus
/// the null-terminated pointer array.
pub fn stack_footprint(argv: &[CString]) -> usize {
    let string_bytes: usize = argv.iter().map(|arg| aligned_arg_len(arg)).sum();
    string_bytes + (argv.len() + 1) * UPTR_SIZE
}

/// Writes the argument vector onto a fresh user stack.
pub struct InitStackWriter {
    pos: Vaddr,
    vm_space: Arc<dyn VmSpace>,
    argv: Vec<CString>,
}

impl InitStackWriter {
    pub fn new(stack_top: Vaddr, vm_space: Arc<dyn VmSpace>, argv: Vec<CString>) -> Self {
        Self {
            pos: stack_top,
            vm_space,
            argv,
        }
    }

    pub fn write(mut self) -> Result<InitStackLayout> {
        if stack_footprint(&self.argv) > ARG_MAX {
            return_errno_with_message!(Errno::E2BIG, "the argument vector is too large");
        }

        let argc = self.argv.len() as u64;

        // String bytes first, last argument highest, so the pointer array
        // below reads in order.
        let mut argv_pointers = Vec::with_capacity(self.argv.len());
        for argv in self.argv.iter().rev() {
            let pointer = write_cstring(&self.vm_space, &mut self.pos, argv)?;
            trace!("argv address = {:#x}", pointer);
            argv_pointers.push(pointer);
        }
        argv_pointers.reverse();

        // The terminator goes in first; the pointers follow in reverse so
        // argv[0] lands lowest.
        write_uptr(&self.vm_space, &mut self.pos, 0)?;
        for pointer in argv_pointers.iter().rev() {
            write_uptr(&self.vm_space, &mut self.pos, *pointer as u64)?;
        }

        let argv_ptr = self.pos;
        debug_assert_eq!(argv_ptr % 8, 0);

        Ok(InitStackLayout {
            argc,
            argv_ptr,
            stack_pointer: argv_ptr,
        })
    }
}

/// Pushes a nul-terminated string, keeping the position 4-byte aligned.
/// Returns the address of the string.
fn write_cstring(vm_space: &Arc<dyn VmSpace>, pos: &mut Vaddr, val: &CString) -> Result<Vaddr> {
    let bytes = val.as_bytes_with_nul();
    *pos = align_down(*pos - bytes.len(), 4);
    vm_space.write_bytes(*pos, bytes)?;
    Ok(*pos)
}

/// Pushes one pointer slot, keeping the position 8-byte aligned.
fn write_uptr(vm_space: &Arc<dyn VmSpace>, pos: &mut Vaddr, val: u64) -> Result<Vaddr> {
    *pos = align_down(*pos - UPTR_SIZE, 8);
    vm_space.write_bytes(*pos, &val.to_ne_bytes())?;
    Ok(*pos)
}

fn align_down(value: usize, alignment: usize) -> usize {
    value & !(alignment - 1)
}

fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Reads an argument vector back from an initialized stack.
pub struct InitStackReader {
    argv_ptr: Vaddr,
    vm_space: Arc<dyn VmSpace>,
}

impl InitStackReader {
    pub fn new(argv_ptr: Vaddr, vm_space: Arc<dyn VmSpace>) -> Self {
        Self { argv_ptr, vm_space }
    }

    /// Walks the pointer array up to its null terminator and reads every
    /// argument string.
    pub fn argv(&self) -> Result<Vec<CString>> {
        let mut argv = Vec::new();
        for slot in 0..=MAX_ARGV_NUMBER {
            let arg_ptr = {
                let mut bytes = [0u8; UPTR_SIZE];
                self.vm_space
                    .read_bytes(self.argv_ptr + slot * UPTR_SIZE, &mut bytes)?;
                u64::from_ne_bytes(bytes) as Vaddr
            };
            if arg_ptr == 0 {
                break;
            }
            argv.push(read_cstring(&self.vm_space, arg_ptr)?);
        }
        Ok(argv)
    }
}

fn read_cstring(vm_space: &Arc<dyn VmSpace>, addr: Vaddr) -> Result<CString> {
    let mut bytes = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        vm_space.read_bytes(addr + bytes.len(), &mut byte)?;
        if byte[0] == 0 {
            // The unwrap cannot fail: the collected bytes contain no nul.
            return Ok(CString::new(bytes).unwrap());
        }
        bytes.push(byte[0]);
        if bytes.len() > ARG_MAX {
            return_errno_with_message!(Errno::E2BIG, "the argument string is unterminated");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_env::MockVmSpace;

    const STACK_TOP: Vaddr = 0x20_0000;

    fn args(list: &[&str]) -> Vec<CString> {
        list.iter().map(|s| CString::new(*s).unwrap()).collect()
    }

    fn write_stack(argv: Vec<CString>) -> (Arc<dyn VmSpace>, InitStackLayout) {
        let vm_space: Arc<dyn VmSpace> = MockVmSpace::empty();
        let layout = InitStackWriter::new(STACK_TOP, vm_space.clone(), argv)
            .write()
            .unwrap();
        (vm_space, layout)
    }

    #[test]
    fn argv_round_trips_through_the_stack() {
        let argv = args(&["/bin/prog", "5", "10"]);
        let (vm_space, layout) = write_stack(argv.clone());

        assert_eq!(layout.argc, 3);
        let read_back = InitStackReader::new(layout.argv_ptr, vm_space)
            .argv()
            .unwrap();
        assert_eq!(read_back, argv);
    }

    #[test]
    fn the_stack_pointer_is_eight_byte_aligned() {
        for list in [&["p"][..], &["p", "xy"][..], &["p", "x", "yzw"][..]] {
            let (_, layout) = write_stack(args(list));
            assert_eq!(layout.stack_pointer % 8, 0);
            assert_eq!(layout.stack_pointer, layout.argv_ptr);
        }
    }

    #[test]
    fn string_addresses_are_four_byte_aligned() {
        let (vm_space, layout) = write_stack(args(&["prog", "a", "bcdef"]));
        for slot in 0..3 {
            let mut bytes = [0u8; 8];
            vm_space
                .read_bytes(layout.argv_ptr + slot * 8, &mut bytes)
                .unwrap();
            let arg_ptr = u64::from_ne_bytes(bytes);
            assert_eq!(arg_ptr % 4, 0);
        }
    }

    #[test]
    fn the_pointer_array_is_null_terminated() {
        let (vm_space, layout) = write_stack(args(&["prog"]));
        let mut bytes = [0u8; 8];
        vm_space
            .read_bytes(layout.argv_ptr + 8, &mut bytes)
            .unwrap();
        assert_eq!(u64::from_ne_bytes(bytes), 0);
    }

    #[test]
    fn an_empty_argv_still_terminates() {
        let (vm_space, layout) = write_stack(Vec::new());
        assert_eq!(layout.argc, 0);
        let read_back = InitStackReader::new(layout.argv_ptr, vm_space)
            .argv()
            .unwrap();
        assert!(read_back.is_empty());
    }

    #[test]
    fn an_oversized_vector_is_rejected_before_any_write() {
        let big = alloc::string::String::from_utf8(vec![b'a'; ARG_MAX]).unwrap();
        let argv = vec![CString::new(big).unwrap()];
        let vm_space: Arc<dyn VmSpace> = MockVmSpace::empty();
        let err = InitStackWriter::new(STACK_TOP, vm_space.clone(), argv)
            .write()
            .unwrap_err();
        assert_eq!(err.error(), Errno::E2BIG);
    }

    #[test]
    fn footprint_counts_padding_and_pointer_slots() {
        // "abc" -> 4 bytes padded, "a" -> 2 -> 4 padded; 3 pointer slots.
        let argv = args(&["abc", "a"]);
        assert_eq!(stack_footprint(&argv), 4 + 4 + 3 * 8);
    }
}
