// SPDX-License-Identifier: MPL-2.0

#![allow(unused)]

pub(crate) use alloc::{
    boxed::Box,
    collections::BTreeMap,
    ffi::CString,
    string::{String, ToString},
    sync::{Arc, Weak},
    vec,
    vec::Vec,
};
pub(crate) use core::{any::Any, ffi::CStr, fmt::Debug};

pub(crate) use ferrite_frame::{
    sync::{Mutex, MutexGuard, RwLock, SpinLock, SpinLockGuard, WaitQueue},
    Vaddr,
};

pub(crate) use bitflags::bitflags;
pub(crate) use lazy_static::lazy_static;
pub(crate) use log::{debug, error, info, trace, warn};

/// Returns the current process.
#[macro_export]
macro_rules! current {
    () => {
        $crate::process::current()
    };
}

/// Returns the current thread.
#[macro_export]
macro_rules! current_thread {
    () => {
        $crate::thread::current_thread()
    };
}

pub(crate) use crate::{
    current, current_thread,
    error::{Errno, Error},
};
pub(crate) type Result<T> = core::result::Result<T, Error>;
pub(crate) use crate::{return_errno, return_errno_with_message};
