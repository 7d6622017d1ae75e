// SPDX-License-Identifier: MPL-2.0

//! Replacing a process image.

use ferrite_frame::{cpu::UserContext, mm::VmSpace, Vaddr};

use super::{
    init_stack::{InitStackLayout, InitStackWriter},
    process_vm::ProcessVm,
};
use crate::{fs::fs_resolver::FsResolver, prelude::*, vm::vm_provider};

/// A program image loaded into an address space, ready to enter.
pub(super) struct LoadedProgram {
    entry: Vaddr,
    layout: InitStackLayout,
}

impl LoadedProgram {
    /// Points `ctx` at the first user instruction of the image, with
    /// `argc`/`argv` in the entry registers and a null environment.
    pub(super) fn apply_to(&self, ctx: &mut UserContext) {
        ctx.set_instruction_pointer(self.entry);
        ctx.set_stack_pointer(self.layout.stack_pointer);
        ctx.set_entry_args(self.layout.argc, self.layout.argv_ptr);
    }
}

/// Loads the executable at `path` into `vm_space` and marshals `argv` onto
/// its fresh stack.
///
/// The target space is built up in place; the caller still owns it, so a
/// failure at any step leaves the caller's previous image untouched.
pub(super) fn load_program_into(
    fs: &FsResolver,
    vm_space: &Arc<dyn VmSpace>,
    path: &str,
    argv: Vec<CString>,
) -> Result<LoadedProgram> {
    let program = fs.lookup(path)?;
    let entry = vm_provider().load_program(vm_space, &program)?;
    // The loader is done with the executable.
    drop(program);

    let stack_top = vm_provider().map_stack(vm_space)?;
    let layout = InitStackWriter::new(stack_top, vm_space.clone(), argv).write()?;

    Ok(LoadedProgram { entry, layout })
}

/// Replaces the current process image with the executable at `path`.
///
/// On success the process keeps its PID, descriptor table and working
/// directory; the old address space is destroyed only after the new image
/// is complete, so every failure path returns to the caller still running
/// the old image.
pub fn do_exec(path: &str, argv: Vec<CString>, ctx: &mut UserContext) -> Result<()> {
    let current = current!();
    debug!("exec {:?}, argc = {}", path, argv.len());

    let new_space = vm_provider().alloc()?;
    let program = current.with_fs(|fs| load_program_into(fs, &new_space, path, argv))?;

    // The point of no return: swap in the finished image. Dropping the
    // guard's previous value releases the old address space.
    *current.process_vm().lock() = Some(ProcessVm::new(new_space.clone()));
    current.set_executable_path(path.to_string());
    new_space.activate();

    program.apply_to(ctx);
    Ok(())
}
