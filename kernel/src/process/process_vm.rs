// SPDX-License-Identifier: MPL-2.0

use ferrite_frame::mm::VmSpace;

use crate::{prelude::*, vm::vm_provider};

/// The user-memory image of a process.
///
/// The wrapped space is exclusively held: fork duplicates it, exec replaces
/// it wholesale, and dropping the wrapper releases the old image.
pub struct ProcessVm {
    vm_space: Arc<dyn VmSpace>,
}

impl ProcessVm {
    pub fn new(vm_space: Arc<dyn VmSpace>) -> Self {
        Self { vm_space }
    }

    /// Allocates a fresh, empty image.
    pub fn alloc() -> Result<Self> {
        Ok(Self {
            vm_space: vm_provider().alloc()?,
        })
    }

    /// Deep-copies `other` for a forked child.
    pub fn fork_from(other: &ProcessVm) -> Result<Self> {
        Ok(Self {
            vm_space: vm_provider().fork(&other.vm_space)?,
        })
    }

    pub fn vm_space(&self) -> &Arc<dyn VmSpace> {
        &self.vm_space
    }
}
