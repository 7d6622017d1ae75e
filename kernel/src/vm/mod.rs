// SPDX-License-Identifier: MPL-2.0

//! The address-space-manager seam.
//!
//! Address spaces are opaque handles (see [`ferrite_frame::mm::VmSpace`]);
//! creating, duplicating and populating them is the virtual-memory
//! manager's job, reached through the provider registered at boot.

use ferrite_frame::{mm::VmSpace, sync::Once, Vaddr};

use crate::{prelude::*, vfs::Vnode};

/// Creates and populates user address spaces.
pub trait VmProvider: Send + Sync {
    /// A fresh, empty address space.
    fn alloc(&self) -> Result<Arc<dyn VmSpace>>;

    /// A deep copy of `src`, for fork.
    fn fork(&self, src: &Arc<dyn VmSpace>) -> Result<Arc<dyn VmSpace>>;

    /// Loads the executable behind `program` into `space` and returns its
    /// entry point.
    fn load_program(&self, space: &Arc<dyn VmSpace>, program: &Arc<dyn Vnode>) -> Result<Vaddr>;

    /// Maps the user stack in `space` and returns its top (highest)
    /// address.
    fn map_stack(&self, space: &Arc<dyn VmSpace>) -> Result<Vaddr>;
}

static VM_PROVIDER: Once<&'static dyn VmProvider> = Once::new();

/// Registers the virtual-memory provider. Must be called exactly once at
/// boot.
pub fn set_vm_provider(provider: &'static dyn VmProvider) {
    VM_PROVIDER.call_once(|| provider);
}

/// Returns the registered virtual-memory provider.
///
/// # Panics
///
/// Panics if no provider has been registered.
pub fn vm_provider() -> &'static dyn VmProvider {
    *VM_PROVIDER
        .get()
        .expect("no virtual-memory provider is registered")
}
